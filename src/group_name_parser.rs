use crate::constants::*;
use crate::types::*;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedGroupAttributes {
    pub category_group_name: String,
    pub attributes: Option<GroupAttributes>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupAttributes {
    pub frequency: String,
    pub priority: String,
    pub category_type: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DisplayAttributes {
    pub frequency: Option<String>,
    pub priority: Option<String>,
    pub category_type: Option<String>,
}

/// Parses a category group name of the form `Frequency:Priority:Type`.
///
/// Anything that isn't exactly three non-blank colon-separated segments yields
/// no attributes.  The original string is always echoed back untrimmed.
pub fn parse_group_name<S: ToString + ?Sized>(input: &S) -> ParsedGroupAttributes {
    let category_group_name = input.to_string();
    let segments: Vec<&str> = category_group_name
        .split(GROUP_NAME_SEPARATOR)
        .map(str::trim)
        .collect();
    let attributes = match segments.as_slice() {
        [frequency, priority, category_type]
            if !frequency.is_empty() && !priority.is_empty() && !category_type.is_empty() =>
        {
            Some(GroupAttributes {
                frequency: frequency.to_string(),
                priority: priority.to_string(),
                category_type: category_type.to_string(),
            })
        }
        _ => None,
    };
    ParsedGroupAttributes {
        category_group_name,
        attributes,
    }
}

/// Parsed group name attributes take precedence; the raw category fields are
/// only consulted when the group name doesn't parse.
pub fn resolve_display_attributes(category: &Category) -> DisplayAttributes {
    match parse_group_name(&category.category_group_name).attributes {
        Some(attributes) => DisplayAttributes {
            frequency: Some(attributes.frequency),
            priority: Some(attributes.priority),
            category_type: Some(attributes.category_type),
        },
        None => DisplayAttributes {
            frequency: category.frequency.clone(),
            priority: category.priority.clone(),
            category_type: category.category_type.clone(),
        },
    }
}

impl GroupAttributes {
    pub fn get(&self, key: GroupAttributeKey) -> &str {
        match key {
            GroupAttributeKey::Frequency => &self.frequency,
            GroupAttributeKey::Priority => &self.priority,
            GroupAttributeKey::Type => &self.category_type,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupAttributeKey {
    Frequency,
    Priority,
    Type,
}

impl GroupAttributeKey {
    pub fn from_key(key: &str) -> Option<GroupAttributeKey> {
        match key {
            "frequency" => Some(GroupAttributeKey::Frequency),
            "priority" => Some(GroupAttributeKey::Priority),
            "type" => Some(GroupAttributeKey::Type),
            _ => None,
        }
    }
}

impl DisplayAttributes {
    pub fn is_variable(&self) -> bool {
        self.category_type
            .as_deref()
            .map_or(false, |t| t.eq_ignore_ascii_case(VARIABLE_CATEGORY_TYPE))
    }
}

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::str::FromStr;

use crate::errors::*;
use crate::group_name_parser::*;
use crate::types::*;
use crate::utilities::*;

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Filters are AND-ed together, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    filters: Vec<(String, FilterValue)>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CategoryField {
    Id,
    Name,
    CategoryGroupId,
    CategoryGroupName,
    Budgeted,
    Activity,
    Balance,
    Hidden,
    Deleted,
}

/// A category field looked up by name.  `Absent` is what a missing field resolves to,
/// and it never equals any filter value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
    Json(String),
    Absent,
}

/// Filters and sorts categories, returning a new list.  The input is never modified.
pub fn apply_filter_sort(
    categories: &[Category],
    filter_state: Option<&FilterState>,
    sort_state: Option<&SortState>,
) -> Vec<Category> {
    let mut result: Vec<Category> = match filter_state {
        Some(filter_state) => categories
            .iter()
            .filter(|category| filter_state.matches(category))
            .cloned()
            .collect(),
        None => categories.to_vec(),
    };
    if let Some(sort_state) = sort_state {
        sort_categories(&mut result, sort_state);
    }
    result
}

fn sort_categories(categories: &mut Vec<Category>, sort_state: &SortState) {
    let direction = sort_state.direction;
    match GroupAttributeKey::from_key(&sort_state.key) {
        Some(attribute_key) => {
            let mut keyed: Vec<(Option<String>, Category)> = categories
                .drain(..)
                .map(|category| {
                    let key = parse_group_name(&category.category_group_name)
                        .attributes
                        .map(|attributes| attributes.get(attribute_key).to_string());
                    (key, category)
                })
                .collect();
            // Unparseable group names always go last, whatever the direction.
            keyed.sort_by(|(a, _), (b, _)| match (a, b) {
                (Some(a), Some(b)) => direction.apply(a.cmp(b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
            categories.extend(keyed.into_iter().map(|(_, category)| category));
        }
        None => {
            let mut keyed: Vec<(FieldValue, Category)> = categories
                .drain(..)
                .map(|category| (field_value(&category, &sort_state.key), category))
                .collect();
            let mode = ComparisonMode::for_values(keyed.iter().map(|(value, _)| value));
            keyed.sort_by(|(a, _), (b, _)| direction.apply(mode.compare(a, b)));
            categories.extend(keyed.into_iter().map(|(_, category)| category));
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ComparisonMode {
    Native,
    Coerced,
}

impl ComparisonMode {
    // Values of one kind compare natively; a number/string mix compares as strings.
    // Null, absent and structured values don't take part in the choice.
    fn for_values<'a, I: Iterator<Item = &'a FieldValue>>(values: I) -> ComparisonMode {
        let mut kinds = values
            .filter(|value| value.is_scalar())
            .map(mem::discriminant);
        match kinds.next() {
            Some(first) if kinds.all(|kind| kind == first) => ComparisonMode::Native,
            Some(_) => ComparisonMode::Coerced,
            None => ComparisonMode::Native,
        }
    }

    // Scalars sort before null, absent and structured values.
    fn compare(self, a: &FieldValue, b: &FieldValue) -> Ordering {
        match (a.is_scalar(), b.is_scalar()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => (),
        }
        match (self, a, b) {
            (ComparisonMode::Native, FieldValue::Number(a), FieldValue::Number(b)) => {
                a.total_cmp(b)
            }
            (ComparisonMode::Native, FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (ComparisonMode::Native, FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            _ => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(direction: &str) -> Result<SortDirection> {
        match direction {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => bail!("Invalid sort direction (asc or desc): {}", direction),
        }
    }
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl SortState {
    pub fn new(key: &str, direction: SortDirection) -> SortState {
        SortState {
            key: key.to_string(),
            direction,
        }
    }
}

impl FilterState {
    pub fn new() -> FilterState {
        FilterState::default()
    }

    pub fn with(mut self, key: &str, value: FilterValue) -> FilterState {
        self.filters.push((key.to_string(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Parses a `key=value` filter argument.  Values that look like booleans or
    /// numbers are treated as such.
    pub fn parse_filter_arg(arg: &str) -> Result<(String, FilterValue)> {
        let (key, value) = split_key_value(arg).chain_err(|| "Invalid filter")?;
        let value = match value {
            "true" => FilterValue::Bool(true),
            "false" => FilterValue::Bool(false),
            _ => match value.parse::<f64>() {
                Ok(number) if number.is_finite() => FilterValue::Number(number),
                _ => FilterValue::Text(value.to_string()),
            },
        };
        Ok((key.to_string(), value))
    }

    pub fn matches(&self, category: &Category) -> bool {
        self.filters
            .iter()
            .all(|(key, value)| match GroupAttributeKey::from_key(key) {
                Some(attribute_key) => match (
                    parse_group_name(&category.category_group_name).attributes,
                    value,
                ) {
                    (Some(attributes), FilterValue::Text(expected)) => {
                        attributes.get(attribute_key) == expected
                    }
                    _ => false,
                },
                None => field_value(category, key).matches(value),
            })
    }
}

impl CategoryField {
    pub fn from_key(key: &str) -> Option<CategoryField> {
        match key {
            "id" => Some(CategoryField::Id),
            "name" => Some(CategoryField::Name),
            "category_group_id" => Some(CategoryField::CategoryGroupId),
            "category_group_name" => Some(CategoryField::CategoryGroupName),
            "budgeted" => Some(CategoryField::Budgeted),
            "activity" => Some(CategoryField::Activity),
            "balance" => Some(CategoryField::Balance),
            "hidden" => Some(CategoryField::Hidden),
            "deleted" => Some(CategoryField::Deleted),
            _ => None,
        }
    }

    pub fn get(self, category: &Category) -> FieldValue {
        match self {
            CategoryField::Id => FieldValue::Text(category.id.0.clone()),
            CategoryField::Name => FieldValue::Text(category.name.clone()),
            CategoryField::CategoryGroupId => FieldValue::Text(category.category_group_id.clone()),
            CategoryField::CategoryGroupName => {
                FieldValue::Text(category.category_group_name.clone())
            }
            CategoryField::Budgeted => FieldValue::Number(category.budgeted as f64),
            CategoryField::Activity => FieldValue::Number(category.activity as f64),
            CategoryField::Balance => FieldValue::Number(category.balance as f64),
            CategoryField::Hidden => FieldValue::Bool(category.hidden),
            CategoryField::Deleted => FieldValue::Bool(category.deleted),
        }
    }
}

/// Resolves a field by name: known fields first, then vendor extension fields.
/// `frequency`, `priority` and `type` never reach here from filters or sorts;
/// those keys go through the parsed group name.
pub fn field_value(category: &Category, key: &str) -> FieldValue {
    if let Some(field) = CategoryField::from_key(key) {
        return field.get(category);
    }
    match category.extensions.get(key) {
        Some(serde_json::Value::String(value)) => FieldValue::Text(value.clone()),
        Some(serde_json::Value::Number(value)) => {
            value.as_f64().map_or(FieldValue::Null, FieldValue::Number)
        }
        Some(serde_json::Value::Bool(value)) => FieldValue::Bool(*value),
        Some(serde_json::Value::Null) => FieldValue::Null,
        Some(value) => FieldValue::Json(value.to_string()),
        None => FieldValue::Absent,
    }
}

impl FieldValue {
    fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldValue::Text(_) | FieldValue::Number(_) | FieldValue::Bool(_)
        )
    }

    pub fn matches(&self, filter_value: &FilterValue) -> bool {
        match (self, filter_value) {
            (FieldValue::Text(a), FilterValue::Text(b)) => a == b,
            (FieldValue::Number(a), FilterValue::Number(b)) => a == b,
            (FieldValue::Bool(a), FilterValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => write!(f, "{}", value),
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Json(value) => write!(f, "{}", value),
            FieldValue::Absent => write!(f, "undefined"),
        }
    }
}

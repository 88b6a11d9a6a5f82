use std::collections::{HashMap, HashSet};

use crate::group_name_parser::*;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenarioState {
    pub enabled: bool,
    pub adjusted_amount: f64,
    budgeted: f64,
}

/// What-if overrides for one loaded category list.  Build a new engine (or call
/// `initialize`) whenever the category list is refetched.
#[derive(Clone, Debug, Default)]
pub struct ScenarioEngine {
    states: HashMap<YnabCategoryId, ScenarioState>,
}

impl ScenarioState {
    fn new(budgeted: f64) -> ScenarioState {
        ScenarioState {
            enabled: true,
            adjusted_amount: budgeted,
            budgeted,
        }
    }

    pub fn contribution(&self) -> f64 {
        if self.enabled {
            self.adjusted_amount
        } else {
            0.0
        }
    }
}

impl ScenarioEngine {
    pub fn new(categories: &[Category]) -> ScenarioEngine {
        let mut engine = ScenarioEngine::default();
        engine.initialize(categories);
        engine
    }

    pub fn initialize(&mut self, categories: &[Category]) {
        self.states = categories
            .iter()
            .map(|category| {
                (
                    category.id.clone(),
                    ScenarioState::new(category.budgeted as f64),
                )
            })
            .collect();
    }

    pub fn state(&self, id: &YnabCategoryId) -> Option<&ScenarioState> {
        self.states.get(id)
    }

    pub fn toggle(&mut self, id: &YnabCategoryId) {
        if let Some(state) = self.states.get_mut(id) {
            state.enabled = !state.enabled;
        }
    }

    pub fn set_enabled(&mut self, id: &YnabCategoryId, enabled: bool) {
        if let Some(state) = self.states.get_mut(id) {
            state.enabled = enabled;
        }
    }

    /// Overrides are only offered for variable categories (see `is_adjustable`),
    /// but the engine itself accepts them for any id.
    pub fn adjust(&mut self, id: &YnabCategoryId, amount: f64) {
        if let Some(state) = self.states.get_mut(id) {
            state.adjusted_amount = amount;
        }
    }

    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            *state = ScenarioState::new(state.budgeted);
        }
    }

    pub fn is_adjustable(&self, category: &Category) -> bool {
        resolve_display_attributes(category).is_variable()
    }

    pub fn contribution(&self, category: &Category) -> f64 {
        self.states
            .get(&category.id)
            .map_or(category.budgeted as f64, ScenarioState::contribution)
    }

    pub fn total(&self, categories: &[Category]) -> f64 {
        categories
            .iter()
            .map(|category| self.contribution(category))
            .sum()
    }

    /// Builds a spreadsheet formula such as `=100 + 2000` from the selected
    /// categories, in list order.  Returns `None` when nothing is selected.
    pub fn selected_formula(
        &self,
        categories: &[Category],
        selected_ids: &HashSet<YnabCategoryId>,
    ) -> Option<String> {
        let amounts: Vec<String> = categories
            .iter()
            .filter(|category| selected_ids.contains(&category.id))
            .map(|category| self.contribution(category).to_string())
            .collect();
        if amounts.is_empty() {
            None
        } else {
            Some(format!("={}", amounts.join(" + ")))
        }
    }
}

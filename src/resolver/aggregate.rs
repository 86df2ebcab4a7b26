//! Per-recipe aggregates

use indexmap::IndexMap;
use serde::Serialize;

use crate::recipes::RecipeDefinition;

/// Everything a run has resolved through one composite recipe.
///
/// Created on the first visit to the recipe and updated on every later one,
/// from any root. `total_weight` is derived: it is recomputed from the
/// component totals on every update and cannot be set directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedAggregate {
    /// Cumulative quantity per display name
    #[serde(rename = "recipe")]
    component_totals: IndexMap<String, f64>,

    /// Sum of `component_totals`
    total_weight: f64,

    /// Sold quantity counter, present only for sellable sub-recipes
    #[serde(rename = "quantity", skip_serializing_if = "Option::is_none")]
    tracked_quantity: Option<u32>,
}

impl ResolvedAggregate {
    /// An empty aggregate for `recipe`; sellable recipes start their counter at zero.
    pub(crate) fn for_recipe(recipe: &RecipeDefinition) -> Self {
        Self {
            component_totals: IndexMap::with_capacity(recipe.components.len()),
            total_weight: 0.0,
            tracked_quantity: recipe.is_sellable().then_some(0),
        }
    }

    /// Merge `quantity` into the total for `display`.
    pub(crate) fn add(&mut self, display: &str, quantity: f64) {
        match self.component_totals.get_mut(display) {
            Some(total) => *total += quantity,
            None => {
                self.component_totals.insert(display.to_string(), quantity);
            }
        }

        self.total_weight = self.component_totals.values().sum();
    }

    /// Cumulative quantity per display name, in first-seen order.
    pub fn component_totals(&self) -> &IndexMap<String, f64> {
        &self.component_totals
    }

    /// Cumulative quantity for one display name.
    pub fn component_total(&self, display: &str) -> Option<f64> {
        self.component_totals.get(display).copied()
    }

    /// Sum of all component totals.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Sold quantity counter of a sellable sub-recipe.
    pub fn tracked_quantity(&self) -> Option<u32> {
        self.tracked_quantity
    }
}

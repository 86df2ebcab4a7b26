//! Recipes
//!
//! A recipe file is a flat, ordered mapping of component keys to relative
//! weights. A few reserved keys carry recipe attributes instead of components:
//!
//! ```yaml
//! flour: 1000
//! water|hydration: 650
//! sourdough: 200
//! -rye: 50                         # disabled: keeps its share, never resolved
//! selling_price_per_kg_incl_taxes: 9.5
//! safety_margin: 1.02
//! ```

use indexmap::IndexMap;
use serde_norway::Value;
use thiserror::Error;

pub mod component;

pub use component::{Component, ComponentKey};

use component::DISABLED_PREFIX;

/// Reserved key marking a recipe as sellable on its own.
pub const SELLING_PRICE_KEY: &str = "selling_price_per_kg_incl_taxes";

/// Reserved key holding the recipe's safety margin multiplier.
pub const SAFETY_MARGIN_KEY: &str = "safety_margin";

/// Errors raised while turning a recipe file into a [`RecipeDefinition`].
#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    /// A component key has an empty name or too many separators.
    #[error("invalid component key {0:?}")]
    InvalidComponentKey(String),

    /// A component weight is not a finite, non-negative number.
    #[error("component {component:?} has invalid weight {value}")]
    InvalidWeight {
        /// Component key as written in the file
        component: String,

        /// Offending value, rendered for the message
        value: String,
    },

    /// A reserved attribute does not hold a usable number.
    #[error("attribute {attribute:?} has invalid value {value}")]
    InvalidAttribute {
        /// Attribute key
        attribute: &'static str,

        /// Offending value, rendered for the message
        value: String,
    },
}

/// A composite recipe: weighted components plus optional sale attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDefinition {
    /// Recipe name
    pub name: String,

    /// Components in declaration order
    pub components: Vec<Component>,

    /// Selling price per kg, taxes included, when sold as-is
    pub selling_price_per_kg_incl_taxes: Option<f64>,

    /// Multiplier applied to every quantity entering this recipe
    pub safety_margin: f64,

    /// Summed weight of disabled components, still part of the denominator
    pub disabled_weight: f64,
}

impl RecipeDefinition {
    /// Creates a recipe with the given components and no sale attributes.
    pub fn new(name: impl Into<String>, components: impl Into<Vec<Component>>) -> Self {
        Self {
            name: name.into(),
            components: components.into(),
            selling_price_per_kg_incl_taxes: None,
            safety_margin: 1.0,
            disabled_weight: 0.0,
        }
    }

    /// Builds a recipe from `(key, weight)` pairs, parsing each key.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidComponentKey`] or [`RecipeError::InvalidWeight`].
    pub fn from_weights<'k>(
        name: impl Into<String>,
        weights: impl IntoIterator<Item = (&'k str, f64)>,
    ) -> Result<Self, RecipeError> {
        let components = weights
            .into_iter()
            .map(|(key, weight)| Ok(Component::new(key.parse()?, check_weight(key, weight)?)))
            .collect::<Result<Vec<_>, RecipeError>>()?;

        Ok(Self::new(name, components))
    }

    /// Parses the entries of a recipe file.
    ///
    /// Disabled components (keys starting with `-`) are not resolved, but
    /// their weight stays in the denominator: the batch share they held is
    /// left out rather than spread over the other components.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] for malformed keys, weights or attributes.
    pub fn from_entries(
        name: impl Into<String>,
        entries: IndexMap<String, Value>,
    ) -> Result<Self, RecipeError> {
        let mut recipe = Self::new(name, Vec::new());

        for (key, value) in entries {
            match key.as_str() {
                SELLING_PRICE_KEY => {
                    let price = attribute(SELLING_PRICE_KEY, &value)?;

                    if price < 0.0 {
                        return Err(invalid_attribute(SELLING_PRICE_KEY, &value));
                    }

                    recipe.selling_price_per_kg_incl_taxes = Some(price);
                }
                SAFETY_MARGIN_KEY => {
                    let margin = attribute(SAFETY_MARGIN_KEY, &value)?;

                    if margin <= 0.0 {
                        return Err(invalid_attribute(SAFETY_MARGIN_KEY, &value));
                    }

                    recipe.safety_margin = margin;
                }
                _ if key.starts_with(DISABLED_PREFIX) => {
                    let weight = value.as_f64().ok_or_else(|| RecipeError::InvalidWeight {
                        component: key.clone(),
                        value: render(&value),
                    })?;

                    recipe.disabled_weight += check_weight(&key, weight)?;
                }
                _ => {
                    let weight = value.as_f64().ok_or_else(|| RecipeError::InvalidWeight {
                        component: key.clone(),
                        value: render(&value),
                    })?;

                    let weight = check_weight(&key, weight)?;

                    recipe.components.push(Component::new(key.parse()?, weight));
                }
            }
        }

        Ok(recipe)
    }

    /// Sets the selling price per kg, taxes included.
    #[must_use]
    pub fn with_selling_price(mut self, price_per_kg_incl_taxes: f64) -> Self {
        self.selling_price_per_kg_incl_taxes = Some(price_per_kg_incl_taxes);
        self
    }

    /// Sets the safety margin multiplier.
    #[must_use]
    pub fn with_safety_margin(mut self, safety_margin: f64) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    /// Sets the summed weight of disabled components.
    #[must_use]
    pub fn with_disabled_weight(mut self, disabled_weight: f64) -> Self {
        self.disabled_weight = disabled_weight;
        self
    }

    /// Sum of all component weights, disabled ones included.
    pub fn denominator(&self) -> f64 {
        self.components.iter().map(|c| c.weight).sum::<f64>() + self.disabled_weight
    }

    /// Returns true if the recipe can be sold on its own.
    pub fn is_sellable(&self) -> bool {
        self.selling_price_per_kg_incl_taxes.is_some()
    }
}

fn check_weight(component: &str, weight: f64) -> Result<f64, RecipeError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(RecipeError::InvalidWeight {
            component: component.to_string(),
            value: weight.to_string(),
        })
    }
}

fn attribute(attribute: &'static str, value: &Value) -> Result<f64, RecipeError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid_attribute(attribute, value))
}

fn invalid_attribute(attribute: &'static str, value: &Value) -> RecipeError {
    RecipeError::InvalidAttribute {
        attribute,
        value: render(value),
    }
}

fn render(value: &Value) -> String {
    serde_norway::to_string(value).map_or_else(
        |_err| format!("{value:?}"),
        |s| s.trim_end().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn parse(yaml: &str) -> Result<RecipeDefinition, Box<dyn std::error::Error>> {
        let entries: IndexMap<String, Value> = serde_norway::from_str(yaml)?;

        Ok(RecipeDefinition::from_entries("test", entries)?)
    }

    #[test]
    fn components_keep_declaration_order() -> TestResult {
        let recipe = parse("water: 1\nflour: 2\nsalt: 0.05\n")?;

        let sources: Vec<&str> = recipe.components.iter().map(Component::source).collect();

        assert_eq!(sources, ["water", "flour", "salt"]);
        assert!(
            (recipe.denominator() - 3.05).abs() < 1e-12,
            "denominator sums the weights"
        );

        Ok(())
    }

    #[test]
    fn reserved_keys_are_attributes_not_components() -> TestResult {
        let recipe = parse(
            "flour: 2\nwater: 1\nselling_price_per_kg_incl_taxes: 12.5\nsafety_margin: 1.1\n",
        )?;

        assert_eq!(recipe.components.len(), 2, "only two components");
        assert_eq!(recipe.selling_price_per_kg_incl_taxes, Some(12.5));
        assert!(recipe.is_sellable(), "selling price makes it sellable");
        assert!(
            (recipe.denominator() - 3.0).abs() < f64::EPSILON,
            "attributes stay out of the denominator"
        );
        assert!((recipe.safety_margin - 1.1).abs() < f64::EPSILON, "margin read");

        Ok(())
    }

    #[test]
    fn disabled_components_keep_their_share_of_the_denominator() -> TestResult {
        let recipe = parse("flour: 2\n-rye: 5\nwater: 1\n")?;

        assert_eq!(recipe.components.len(), 2, "disabled rye is not a component");
        assert!(
            (recipe.disabled_weight - 5.0).abs() < f64::EPSILON,
            "rye weight is kept aside"
        );
        assert!(
            (recipe.denominator() - 8.0).abs() < f64::EPSILON,
            "disabled weight is counted"
        );

        Ok(())
    }

    #[test]
    fn disabled_component_needs_a_numeric_weight() -> TestResult {
        let entries: IndexMap<String, Value> = serde_norway::from_str("flour: 2\n-rye: lots\n")?;

        let result = RecipeDefinition::from_entries("test", entries);

        assert!(
            matches!(result, Err(RecipeError::InvalidWeight { ref component, .. }) if component == "-rye"),
            "unexpected result: {result:?}"
        );

        Ok(())
    }

    #[test]
    fn aliased_component_is_parsed_once() -> TestResult {
        let recipe = parse("flour-t80|flour: 1\nflour-t65|flour: 1\n")?;

        let displays: Vec<&str> = recipe.components.iter().map(Component::display).collect();

        assert_eq!(displays, ["flour", "flour"]);
        assert_eq!(
            recipe.components.first().map(Component::source),
            Some("flour-t80")
        );

        Ok(())
    }

    #[test]
    fn non_numeric_weight_is_rejected() -> TestResult {
        let entries: IndexMap<String, Value> = serde_norway::from_str("flour: lots\n")?;

        let result = RecipeDefinition::from_entries("test", entries);

        assert!(
            matches!(result, Err(RecipeError::InvalidWeight { ref component, .. }) if component == "flour"),
            "unexpected result: {result:?}"
        );

        Ok(())
    }

    #[test]
    fn negative_weight_is_rejected() {
        let result = RecipeDefinition::from_weights("test", [("flour", -1.0)]);

        assert!(
            matches!(result, Err(RecipeError::InvalidWeight { .. })),
            "negative weight accepted: {result:?}"
        );
    }

    #[test]
    fn non_positive_safety_margin_is_rejected() -> TestResult {
        let entries: IndexMap<String, Value> = serde_norway::from_str("flour: 1\nsafety_margin: 0\n")?;

        let result = RecipeDefinition::from_entries("test", entries);

        assert!(
            matches!(
                result,
                Err(RecipeError::InvalidAttribute {
                    attribute: SAFETY_MARGIN_KEY,
                    ..
                })
            ),
            "zero margin accepted: {result:?}"
        );

        Ok(())
    }

    #[test]
    fn all_zero_weights_still_parse() -> TestResult {
        let recipe = RecipeDefinition::from_weights("empty", [("flour", 0.0), ("water", 0.0)])?;

        assert!(
            recipe.denominator().abs() < f64::EPSILON,
            "zero-sum is left to the resolver"
        );

        Ok(())
    }
}

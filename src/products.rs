//! Products

use serde::Deserialize;
use thiserror::Error;

/// Errors found while validating a product definition.
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// A weight or rate is negative, zero where it must not be, or not finite.
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        /// Offending field
        field: &'static str,

        /// Human-readable range
        expected: &'static str,

        /// Offending value
        value: f64,
    },

    /// A selling price was declared without the baked weight needed to price a piece.
    #[error("selling_price_per_kg_incl_taxes requires bread_baked_weight")]
    MissingBakedWeight,
}

/// How a sellable product is made: dough per piece, loss and root recipe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductDefinition {
    /// Product name
    #[serde(skip)]
    pub name: String,

    /// Raw dough weight per piece
    pub dough_weight: f64,

    /// Multiplier accounting for process loss
    #[serde(default = "default_loss_rate")]
    pub loss_rate: f64,

    /// Root recipe the dough is made from
    pub recipe: String,

    /// Selling price per kg of baked product, taxes included
    #[serde(default)]
    pub selling_price_per_kg_incl_taxes: Option<f64>,

    /// Weight of one baked piece
    #[serde(default, rename = "bread_baked_weight")]
    pub baked_weight: Option<f64>,
}

fn default_loss_rate() -> f64 {
    1.0
}

impl ProductDefinition {
    /// Creates a product with no loss and no selling price.
    pub fn new(name: impl Into<String>, recipe: impl Into<String>, dough_weight: f64) -> Self {
        Self {
            name: name.into(),
            dough_weight,
            loss_rate: default_loss_rate(),
            recipe: recipe.into(),
            selling_price_per_kg_incl_taxes: None,
            baked_weight: None,
        }
    }

    /// Sets the loss rate.
    #[must_use]
    pub fn with_loss_rate(mut self, loss_rate: f64) -> Self {
        self.loss_rate = loss_rate;
        self
    }

    /// Sets the selling price per kg (taxes included) and the baked weight of a piece.
    #[must_use]
    pub fn with_selling_price(mut self, price_per_kg_incl_taxes: f64, baked_weight: f64) -> Self {
        self.selling_price_per_kg_incl_taxes = Some(price_per_kg_incl_taxes);
        self.baked_weight = Some(baked_weight);
        self
    }

    /// Checks ranges and the selling price / baked weight pairing.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ProductError> {
        check("dough_weight", self.dough_weight, "finite and >= 0", |v| v >= 0.0)?;
        check("loss_rate", self.loss_rate, "finite and > 0", |v| v > 0.0)?;

        if let Some(price) = self.selling_price_per_kg_incl_taxes {
            check(
                "selling_price_per_kg_incl_taxes",
                price,
                "finite and >= 0",
                |v| v >= 0.0,
            )?;

            let baked_weight = self.baked_weight.ok_or(ProductError::MissingBakedWeight)?;

            check("bread_baked_weight", baked_weight, "finite and >= 0", |v| {
                v >= 0.0
            })?;
        }

        Ok(())
    }

    /// Selling price per kg and baked weight, when the product is priced for sale.
    pub fn sale(&self) -> Option<(f64, f64)> {
        self.selling_price_per_kg_incl_taxes.zip(self.baked_weight)
    }
}

fn check(
    field: &'static str,
    value: f64,
    expected: &'static str,
    in_range: impl Fn(f64) -> bool,
) -> Result<(), ProductError> {
    if value.is_finite() && in_range(value) {
        Ok(())
    } else {
        Err(ProductError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn loss_rate_defaults_to_one() -> TestResult {
        let product: ProductDefinition =
            serde_norway::from_str("dough_weight: 0.35\nrecipe: country-dough\n")?;

        assert!((product.loss_rate - 1.0).abs() < f64::EPSILON, "default loss rate");
        assert_eq!(product.recipe, "country-dough");
        assert_eq!(product.sale(), None);
        product.validate()?;

        Ok(())
    }

    #[test]
    fn reads_sale_attributes() -> TestResult {
        let product: ProductDefinition = serde_norway::from_str(
            "dough_weight: 0.6\nloss_rate: 1.05\nrecipe: rye\nselling_price_per_kg_incl_taxes: 8.0\nbread_baked_weight: 0.5\n",
        )?;

        assert_eq!(product.sale(), Some((8.0, 0.5)));
        product.validate()?;

        Ok(())
    }

    #[test]
    fn selling_price_needs_baked_weight() {
        let mut product = ProductDefinition::new("baguette", "dough", 0.3);
        product.selling_price_per_kg_incl_taxes = Some(4.0);

        assert_eq!(product.validate(), Err(ProductError::MissingBakedWeight));
    }

    #[test]
    fn rejects_zero_loss_rate() {
        let product = ProductDefinition::new("baguette", "dough", 0.3).with_loss_rate(0.0);

        assert!(
            matches!(
                product.validate(),
                Err(ProductError::OutOfRange {
                    field: "loss_rate",
                    ..
                })
            ),
            "zero loss rate accepted"
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<ProductDefinition, _> =
            serde_norway::from_str("dough_weight: 0.3\nrecipe: dough\ndough_wieght: 1\n");

        assert!(result.is_err(), "typo in field name should not pass silently");
    }
}

//! Pricing
//!
//! Product-level arithmetic around a resolution: how much dough to resolve for
//! an order line, and what one piece costs and earns.

use serde::Serialize;
use thiserror::Error;

/// Divide-by-zero cases in per-piece figures.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Per-piece cost of a product with no pieces ordered.
    #[error("cannot compute a per-piece cost for '{product}': no pieces ordered")]
    NoPieces {
        /// Product name
        product: String,
    },

    /// Gross margin of a product whose tax-exclusive price is zero.
    #[error("cannot compute the gross margin of '{product}': selling price is zero")]
    ZeroSellingPrice {
        /// Product name
        product: String,
    },
}

/// Dough to resolve for `count` pieces, loss included.
pub fn raw_weight(count: u32, dough_weight: f64, loss_rate: f64) -> f64 {
    f64::from(count) * dough_weight * loss_rate
}

/// Raw-material cost of one piece, taxes excluded.
///
/// # Errors
///
/// Returns [`PricingError::NoPieces`] if `count` is zero.
pub fn cost_per_piece(product: &str, total_cost: f64, count: u32) -> Result<f64, PricingError> {
    if count == 0 {
        return Err(PricingError::NoPieces {
            product: product.to_string(),
        });
    }

    Ok(total_cost / f64::from(count))
}

/// Selling figures and gross margin of one piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    /// Selling price per kg, taxes included
    pub selling_price_per_kg_incl_taxes: f64,

    /// Selling price of one piece, taxes included
    pub selling_price_per_piece_incl_taxes: f64,

    /// Selling price of one piece, taxes excluded
    pub selling_price_per_piece_excl_taxes: f64,

    /// `(price - cost) / price`, in percent, on tax-exclusive figures
    pub gross_margin_rate: f64,
}

impl Margin {
    /// Price a piece of `baked_weight` at `price_per_kg_incl_taxes` and compare
    /// it with its tax-exclusive cost.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ZeroSellingPrice`] if the tax-exclusive price of
    /// a piece is zero.
    pub fn new(
        product: &str,
        price_per_kg_incl_taxes: f64,
        baked_weight: f64,
        vat_factor: f64,
        cost_per_piece_excl_taxes: f64,
    ) -> Result<Self, PricingError> {
        let price_incl_taxes = price_per_kg_incl_taxes * baked_weight;
        let price_excl_taxes = price_incl_taxes / vat_factor;

        if price_excl_taxes == 0.0 || !price_excl_taxes.is_finite() {
            return Err(PricingError::ZeroSellingPrice {
                product: product.to_string(),
            });
        }

        Ok(Self {
            selling_price_per_kg_incl_taxes: price_per_kg_incl_taxes,
            selling_price_per_piece_incl_taxes: price_incl_taxes,
            selling_price_per_piece_excl_taxes: price_excl_taxes,
            gross_margin_rate: (price_excl_taxes - cost_per_piece_excl_taxes) / price_excl_taxes
                * 100.0,
        })
    }
}

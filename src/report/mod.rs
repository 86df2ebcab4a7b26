//! Report
//!
//! The outcome of a run as a nested, serializable mapping: one entry per
//! ordered product and one per composite recipe visited.

use std::io;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::{pricing::Margin, resolver::ResolvedAggregate};

mod table;
mod yaml;

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report could not be converted to a YAML value.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_norway::Error),

    /// The output could not be written.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Textual output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Block YAML, floats with three decimals
    #[default]
    Yaml,

    /// Terminal tables
    Table,
}

/// Figures for one ordered product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReport {
    /// Quantity of each direct component of the root recipe, by display name
    pub recipe: IndexMap<String, f64>,

    /// Pieces ordered
    pub quantity: u32,

    /// Raw dough weight per piece
    pub dough_weight: f64,

    /// Raw-material cost of one piece, taxes excluded
    pub cost_price_per_piece_excl_taxes: f64,

    /// Selling figures, for products priced for sale
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

/// Everything a run computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Ordered products, in first-ordered order
    pub products: IndexMap<String, ProductReport>,

    /// Composite recipes, in first-visit order
    pub recipes: IndexMap<String, ResolvedAggregate>,
}

impl Report {
    /// Write the report in the given format.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the report cannot be serialized or written.
    pub fn write_to(&self, out: impl io::Write, format: ReportFormat) -> Result<(), ReportError> {
        match format {
            ReportFormat::Yaml => self.write_yaml(out),
            ReportFormat::Table => self.write_table(out),
        }
    }

    /// Write the report as block YAML, every float with three decimals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the report cannot be serialized or written.
    pub fn write_yaml(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        yaml::write(&mut out, &serde_norway::to_value(self)?)
    }

    /// Write the report as two tables: products, then recipes.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the output cannot be written.
    pub fn write_table(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        table::write(&mut out, self)
    }
}

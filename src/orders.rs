//! Orders

use indexmap::IndexMap;
use serde::Deserialize;

/// An order file: product name -> number of pieces, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Order {
    lines: IndexMap<String, u32>,
}

impl Order {
    /// Creates an empty order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` pieces of `product`, on top of any already ordered.
    #[must_use]
    pub fn with_line(mut self, product: impl Into<String>, count: u32) -> Self {
        *self.lines.entry(product.into()).or_default() += count;
        self
    }

    /// Iterate over `(product, count)` lines in file order.
    pub fn lines(&self) -> impl Iterator<Item = (&str, u32)> {
        self.lines.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Number of lines, including zero-count ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the order has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Order {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |order, (product, count)| order.with_line(product, count))
    }
}

//! Costing runs
//!
//! A run processes one or more orders against a single store and a single
//! [`Resolver`], so composite recipes shared between products and orders
//! accumulate into the same aggregates.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    orders::Order,
    pricing::{self, Margin, PricingError},
    products::ProductDefinition,
    report::{ProductReport, Report, ReportError},
    resolver::{ResolveError, Resolver},
    settings::GeneralSettings,
    store::{ProductStore, StoreError},
};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A configuration file could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A recipe tree could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A per-piece figure could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Broad classes of run failure, each with its own process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A file or name is missing.
    ConfigNotFound,

    /// A file cannot be read, is not valid YAML or holds invalid values.
    ConfigMalformed,

    /// A recipe's component weights sum to zero.
    DegenerateRecipe,

    /// A recipe contains itself.
    CyclicRecipe,

    /// Division by a zero piece count or a zero selling price.
    ArithmeticDomain,

    /// The report could not be written.
    Output,
}

impl FailureKind {
    /// Process exit status for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::ConfigNotFound => 1,
            Self::ConfigMalformed => 2,
            Self::DegenerateRecipe | Self::CyclicRecipe => 3,
            Self::ArithmeticDomain => 4,
            Self::Output => 5,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigNotFound => "configuration not found",
            Self::ConfigMalformed => "malformed configuration",
            Self::DegenerateRecipe => "degenerate recipe",
            Self::CyclicRecipe => "cyclic recipe",
            Self::ArithmeticDomain => "arithmetic error",
            Self::Output => "output error",
        })
    }
}

impl RunError {
    /// Classify the error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Store(err) | Self::Resolve(ResolveError::Store(err)) => store_failure(err),
            Self::Resolve(ResolveError::UnknownName { .. }) => FailureKind::ConfigNotFound,
            Self::Resolve(ResolveError::DegenerateRecipe { .. }) => FailureKind::DegenerateRecipe,
            Self::Resolve(ResolveError::CyclicRecipe { .. }) => FailureKind::CyclicRecipe,
            Self::Resolve(ResolveError::InvalidQuantity { .. }) => FailureKind::ConfigMalformed,
            Self::Pricing(_) => FailureKind::ArithmeticDomain,
            Self::Report(_) => FailureKind::Output,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

fn store_failure(err: &StoreError) -> FailureKind {
    match err {
        StoreError::NotFound { .. } => FailureKind::ConfigNotFound,
        StoreError::Io { .. }
        | StoreError::Syntax { .. }
        | StoreError::InvalidRecipe { .. }
        | StoreError::InvalidProduct { .. }
        | StoreError::InvalidPrice { .. }
        | StoreError::InvalidSettings { .. } => FailureKind::ConfigMalformed,
    }
}

/// Everything ordered of one product so far.
#[derive(Debug)]
struct ProductTally {
    definition: Rc<ProductDefinition>,
    count: u32,
    total_cost: f64,
    breakdown: IndexMap<String, f64>,
}

/// Orders processed so far and the resolver they share.
#[derive(Debug, Default)]
pub struct CostingRun {
    settings: GeneralSettings,
    resolver: Resolver,
    tallies: IndexMap<String, ProductTally>,
}

impl CostingRun {
    /// Start a run with the given settings.
    #[must_use]
    pub fn new(settings: GeneralSettings) -> Self {
        Self {
            settings,
            resolver: Resolver::new(),
            tallies: IndexMap::new(),
        }
    }

    /// Resolver shared by every order of the run.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve every line of `order`, in order.
    ///
    /// Zero counts are skipped. A product already seen earlier in the run has
    /// its count, cost and breakdown added to the earlier figures.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] if a product or recipe cannot be loaded or
    /// resolved. The run should not be continued after an error.
    pub fn process_order<S>(
        &mut self,
        store: &mut S,
        name: &str,
        order: &Order,
    ) -> Result<(), RunError>
    where
        S: ProductStore + ?Sized,
    {
        info!(order = name, lines = order.len(), "processing order");

        for (product, count) in order.lines() {
            if count == 0 {
                debug!(order = name, product, "skipping zero-count line");
                continue;
            }

            self.process_line(store, name, product, count)?;
        }

        Ok(())
    }

    fn process_line<S>(
        &mut self,
        store: &mut S,
        order: &str,
        product: &str,
        count: u32,
    ) -> Result<(), RunError>
    where
        S: ProductStore + ?Sized,
    {
        let definition = store.product_definition(product)?;
        let raw_weight = pricing::raw_weight(count, definition.dough_weight, definition.loss_rate);

        debug!(order, product, count, raw_weight, "resolving product");

        let resolution = self.resolver.resolve(store, &definition.recipe, raw_weight)?;

        match self.tallies.get_mut(product) {
            Some(tally) => {
                warn!(order, product, "product ordered more than once; merging lines");

                tally.count = tally.count.saturating_add(count);
                tally.total_cost += resolution.cost;

                for (display, quantity) in resolution.direct_children {
                    *tally.breakdown.entry(display).or_default() += quantity;
                }
            }
            None => {
                self.tallies.insert(
                    product.to_string(),
                    ProductTally {
                        definition,
                        count,
                        total_cost: resolution.cost,
                        breakdown: resolution.direct_children,
                    },
                );
            }
        }

        Ok(())
    }

    /// Compute per-piece figures and assemble the report.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Pricing`] if a product with a selling price has a
    /// tax-exclusive price of zero per piece.
    pub fn finish(self) -> Result<Report, RunError> {
        let vat_factor = self.settings.vat_factor;
        let mut products = IndexMap::with_capacity(self.tallies.len());

        for (name, tally) in self.tallies {
            let cost = pricing::cost_per_piece(&name, tally.total_cost, tally.count)?;

            let margin = tally
                .definition
                .sale()
                .map(|(price_per_kg, baked_weight)| {
                    Margin::new(&name, price_per_kg, baked_weight, vat_factor, cost)
                })
                .transpose()?;

            products.insert(
                name,
                ProductReport {
                    recipe: tally.breakdown,
                    quantity: tally.count,
                    dough_weight: tally.definition.dough_weight,
                    cost_price_per_piece_excl_taxes: cost,
                    margin,
                },
            );
        }

        Ok(Report {
            products,
            recipes: self.resolver.into_aggregates(),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{ingredients::BaseIngredient, recipes::RecipeDefinition, store::MemoryStore};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn bakery() -> Result<MemoryStore, Box<dyn std::error::Error>> {
        let mut store = MemoryStore::new();

        store
            .add_ingredient(BaseIngredient::new("flour", 1.0))?
            .add_ingredient(BaseIngredient::new("water", 0.0))?
            .add_ingredient(BaseIngredient::new("salt", 2.0))?;

        store.add_recipe(RecipeDefinition::from_weights(
            "dough",
            [("flour", 2.0), ("water", 1.0)],
        )?);

        store
            .add_product(ProductDefinition::new("roll", "dough", 0.1))?
            .add_product(
                ProductDefinition::new("loaf", "dough", 0.6)
                    .with_selling_price(10.0, 0.5)
                    .with_loss_rate(1.5),
            )?;

        Ok(store)
    }

    #[test]
    fn zero_count_lines_are_skipped() -> TestResult {
        let mut store = bakery()?;
        let mut run = CostingRun::new(GeneralSettings::default());

        run.process_order(&mut store, "monday", &Order::new().with_line("roll", 0))?;
        let report = run.finish()?;

        assert!(report.products.is_empty(), "no entry for a zero count");
        assert!(report.recipes.is_empty(), "nothing resolved");

        Ok(())
    }

    #[test]
    fn reports_cost_and_breakdown() -> TestResult {
        let mut store = bakery()?;
        let mut run = CostingRun::new(GeneralSettings::default());

        // 30 x 0.1 kg -> 2 kg flour, 1 kg water
        run.process_order(&mut store, "monday", &Order::new().with_line("roll", 30))?;
        let report = run.finish()?;

        let roll = report.products.get("roll").ok_or("roll missing")?;

        assert_eq!(roll.quantity, 30);
        assert!(close(roll.recipe.get("flour").copied().unwrap_or_default(), 2.0), "flour");
        assert!(close(roll.cost_price_per_piece_excl_taxes, 2.0 / 30.0), "cost per piece");
        assert_eq!(roll.margin, None, "roll is not priced for sale");

        Ok(())
    }

    #[test]
    fn margin_uses_the_vat_factor() -> TestResult {
        let mut store = bakery()?;
        let mut run = CostingRun::new(GeneralSettings::new(1.25));

        // 10 x 0.6 x 1.5 = 9 kg dough -> 6 kg flour -> 0.6 per piece
        run.process_order(&mut store, "monday", &Order::new().with_line("loaf", 10))?;
        let report = run.finish()?;

        let loaf = report.products.get("loaf").ok_or("loaf missing")?;
        let margin = loaf.margin.ok_or("loaf is priced")?;

        assert!(close(loaf.cost_price_per_piece_excl_taxes, 0.6), "cost");
        assert!(close(margin.selling_price_per_piece_incl_taxes, 5.0), "10/kg x 0.5 kg");
        assert!(close(margin.selling_price_per_piece_excl_taxes, 4.0), "5 / 1.25");
        assert!(close(margin.gross_margin_rate, 85.0), "(4 - 0.6) / 4");

        Ok(())
    }

    #[test]
    fn repeated_products_are_merged_across_orders() -> TestResult {
        let mut store = bakery()?;
        let mut run = CostingRun::new(GeneralSettings::default());

        run.process_order(&mut store, "monday", &Order::new().with_line("roll", 30))?;
        run.process_order(&mut store, "tuesday", &Order::new().with_line("roll", 15))?;
        let report = run.finish()?;

        let roll = report.products.get("roll").ok_or("roll missing")?;
        let dough = report.recipes.get("dough").ok_or("dough missing")?;

        assert_eq!(roll.quantity, 45);
        assert!(close(roll.recipe.get("flour").copied().unwrap_or_default(), 3.0), "flour");
        assert!(close(roll.cost_price_per_piece_excl_taxes, 3.0 / 45.0), "same unit cost");
        assert!(close(dough.total_weight(), 4.5), "aggregate spans both orders");

        Ok(())
    }

    #[test]
    fn zero_selling_price_is_an_arithmetic_failure() -> TestResult {
        let mut store = bakery()?;
        store.add_product(
            ProductDefinition::new("gift", "dough", 0.1).with_selling_price(0.0, 0.1),
        )?;

        let mut run = CostingRun::new(GeneralSettings::default());
        run.process_order(&mut store, "monday", &Order::new().with_line("gift", 1))?;

        let err = run.finish().err().ok_or("free product accepted")?;

        assert_eq!(err.kind(), FailureKind::ArithmeticDomain);
        assert_eq!(err.exit_code(), 4);

        Ok(())
    }

    #[test]
    fn failures_map_to_exit_codes() -> TestResult {
        let mut store = bakery()?;
        store
            .add_recipe(RecipeDefinition::from_weights("empty", [("flour", 0.0)])?)
            .add_recipe(RecipeDefinition::from_weights("loop", [("loop", 1.0)])?)
            .add_product(ProductDefinition::new("void", "empty", 0.1))?
            .add_product(ProductDefinition::new("knot", "loop", 0.1))?
            .add_product(ProductDefinition::new("ghost", "nowhere", 0.1))?;

        for (product, kind, code) in [
            ("missing", FailureKind::ConfigNotFound, 1),
            ("ghost", FailureKind::ConfigNotFound, 1),
            ("void", FailureKind::DegenerateRecipe, 3),
            ("knot", FailureKind::CyclicRecipe, 3),
        ] {
            let mut run = CostingRun::new(GeneralSettings::default());
            let err = run
                .process_order(&mut store, "monday", &Order::new().with_line(product, 1))
                .err()
                .ok_or("order accepted")?;

            assert_eq!(err.kind(), kind, "{product}");
            assert_eq!(err.exit_code(), code, "{product}");
        }

        Ok(())
    }

    #[test]
    fn unreadable_file_is_malformed_not_missing() {
        let err = RunError::from(StoreError::Io {
            path: "data/recipes/dough.yaml".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        assert_eq!(err.kind(), FailureKind::ConfigMalformed);
        assert_eq!(err.exit_code(), 2);
    }
}

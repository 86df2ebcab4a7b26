//! Recipe resolution
//!
//! Walks a recipe tree down to its base ingredients, turning relative
//! component weights into absolute quantities at every level and pricing the
//! leaves. Every composite recipe reached along the way accumulates what went
//! through it in a [`ResolvedAggregate`], for the whole lifetime of the
//! [`Resolver`].

use indexmap::IndexMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::store::{RecipeStore, StoreError};

pub mod aggregate;

pub use aggregate::ResolvedAggregate;

/// Recipe names on the path from the root to the recipe being expanded.
type Path = SmallVec<[String; 8]>;

/// Errors that abort a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A component names something that is neither a base ingredient nor a recipe.
    #[error(
        "'{name}' is neither a base ingredient nor a recipe (used by {})",
        .parent.as_deref().unwrap_or("the order")
    )]
    UnknownName {
        /// Unresolvable name
        name: String,

        /// Recipe that referenced it, if any
        parent: Option<String>,
    },

    /// The component weights of a recipe sum to zero.
    #[error("recipe '{name}' has component weights summing to zero")]
    DegenerateRecipe {
        /// Recipe name
        name: String,
    },

    /// A recipe contains itself, directly or through sub-recipes.
    #[error("recipe cycle: {}", .cycle.join(" -> "))]
    CyclicRecipe {
        /// Names along the cycle, starting and ending with the repeated recipe
        cycle: Vec<String>,
    },

    /// The quantity to resolve is negative or not a number.
    #[error("cannot resolve {quantity} of '{name}'")]
    InvalidQuantity {
        /// Name being resolved
        name: String,

        /// Offending quantity
        quantity: f64,
    },

    /// A definition exists but could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of resolving one name at one quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Cost of everything beneath the name
    pub cost: f64,

    /// Quantity of each direct component, by display name (empty for base ingredients)
    pub direct_children: IndexMap<String, f64>,
}

/// Resolves recipes and accumulates per-recipe aggregates over a run.
#[derive(Debug, Default)]
pub struct Resolver {
    aggregates: IndexMap<String, ResolvedAggregate>,
}

impl Resolver {
    /// Create a resolver with no aggregates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `quantity` of `name`, updating the aggregate of every composite
    /// recipe reached.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if any name in the tree is unknown or
    /// malformed, a recipe's weights sum to zero, a recipe contains itself, or
    /// `quantity` is negative or not finite. Aggregates updated before the
    /// failure are left as they are; the run is expected to stop.
    pub fn resolve<S>(
        &mut self,
        store: &mut S,
        name: &str,
        quantity: f64,
    ) -> Result<Resolution, ResolveError>
    where
        S: RecipeStore + ?Sized,
    {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(ResolveError::InvalidQuantity {
                name: name.to_string(),
                quantity,
            });
        }

        self.visit(store, name, quantity, &mut Path::new())
    }

    /// Aggregates of every composite recipe visited so far, in first-visit order.
    pub fn aggregates(&self) -> &IndexMap<String, ResolvedAggregate> {
        &self.aggregates
    }

    /// Aggregate of one composite recipe, if it has been visited.
    pub fn aggregate(&self, recipe: &str) -> Option<&ResolvedAggregate> {
        self.aggregates.get(recipe)
    }

    /// Consume the resolver, keeping its aggregates.
    pub fn into_aggregates(self) -> IndexMap<String, ResolvedAggregate> {
        self.aggregates
    }

    fn visit<S>(
        &mut self,
        store: &mut S,
        name: &str,
        quantity: f64,
        path: &mut Path,
    ) -> Result<Resolution, ResolveError>
    where
        S: RecipeStore + ?Sized,
    {
        if let Some(ingredient) = store.base_ingredient(name) {
            trace!(ingredient = name, quantity, "priced base ingredient");

            return Ok(Resolution {
                cost: ingredient.cost(quantity),
                direct_children: IndexMap::new(),
            });
        }

        if let Some(start) = path.iter().position(|seen| seen == name) {
            let cycle = path
                .iter()
                .skip(start)
                .cloned()
                .chain([name.to_string()])
                .collect();

            return Err(ResolveError::CyclicRecipe { cycle });
        }

        let recipe = store.recipe_definition(name).map_err(|err| {
            if err.is_not_found() {
                ResolveError::UnknownName {
                    name: name.to_string(),
                    parent: path.last().cloned(),
                }
            } else {
                ResolveError::Store(err)
            }
        })?;

        let denominator = recipe.denominator();

        if denominator <= 0.0 {
            return Err(ResolveError::DegenerateRecipe {
                name: name.to_string(),
            });
        }

        let quantity = quantity * recipe.safety_margin;

        debug!(recipe = name, quantity, depth = path.len(), "resolving recipe");

        let index = self.aggregates.get_index_of(name).unwrap_or_else(|| {
            self.aggregates
                .insert_full(name.to_string(), ResolvedAggregate::for_recipe(&recipe))
                .0
        });

        path.push(name.to_string());

        let mut resolution = Resolution {
            cost: 0.0,
            direct_children: IndexMap::with_capacity(recipe.components.len()),
        };

        for component in &recipe.components {
            let child_quantity = (quantity * component.weight) / denominator;

            if let Some((_, aggregate)) = self.aggregates.get_index_mut(index) {
                aggregate.add(component.display(), child_quantity);
            }

            resolution.cost += self
                .visit(store, component.source(), child_quantity, path)?
                .cost;

            *resolution
                .direct_children
                .entry(component.display().to_string())
                .or_default() += child_quantity;
        }

        path.pop();

        Ok(resolution)
    }
}

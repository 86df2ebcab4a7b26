//! Recipe store
//!
//! Supplies ingredient, recipe and product definitions by name. Definitions
//! are loaded at most once per store and handed out as shared [`Rc`]s so the
//! resolver can keep one while asking the store for the next.

use std::{fmt, io, path::PathBuf, rc::Rc};

use thiserror::Error;

use crate::{
    ingredients::BaseIngredient, products::ProductDefinition, products::ProductError,
    recipes::RecipeDefinition, recipes::RecipeError,
};

pub mod data_dir;
pub mod memory;

pub use data_dir::DataDir;
pub use memory::MemoryStore;

/// The kind of configuration entity a store lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    /// Run-wide settings
    Settings,

    /// Base ingredient catalog
    Ingredients,

    /// Composite recipe
    Recipe,

    /// Product definition
    Product,

    /// Order file
    Order,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Settings => "settings",
            Self::Ingredients => "ingredient catalog",
            Self::Recipe => "recipe",
            Self::Product => "product",
            Self::Order => "order",
        })
    }
}

/// Store lookup and loading errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No definition exists for the name.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was being looked up
        kind: ConfigKind,

        /// Name that failed to resolve
        name: String,
    },

    /// The definition file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,

        /// Underlying IO error
        source: io::Error,
    },

    /// The definition file is not valid YAML or does not have the expected shape.
    #[error("syntax error in {}: {source}", path.display())]
    Syntax {
        /// File being parsed
        path: PathBuf,

        /// Underlying YAML error
        source: serde_norway::Error,
    },

    /// A recipe definition parsed but is not usable.
    #[error("malformed recipe '{name}': {source}")]
    InvalidRecipe {
        /// Recipe name
        name: String,

        /// What is wrong with it
        source: RecipeError,
    },

    /// A product definition parsed but is not usable.
    #[error("malformed product '{name}': {source}")]
    InvalidProduct {
        /// Product name
        name: String,

        /// What is wrong with it
        source: ProductError,
    },

    /// A catalog ingredient has a negative or non-finite price.
    #[error("ingredient '{name}' has invalid price {price}")]
    InvalidPrice {
        /// Ingredient name
        name: String,

        /// Offending price
        price: f64,
    },

    /// The settings cannot be used (e.g. a zero VAT factor).
    #[error("invalid settings: vat must be finite and > 0, got {vat_factor}")]
    InvalidSettings {
        /// Offending VAT factor
        vat_factor: f64,
    },
}

impl StoreError {
    /// Returns true if the error means a definition is missing rather than broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Supplies base ingredients and composite recipes by name.
pub trait RecipeStore {
    /// Looks up `name` in the base ingredient catalog.
    fn base_ingredient(&self, name: &str) -> Option<&BaseIngredient>;

    /// Loads the composite recipe called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such recipe exists, or another
    /// [`StoreError`] if its definition is malformed.
    fn recipe_definition(&mut self, name: &str) -> Result<Rc<RecipeDefinition>, StoreError>;
}

/// A [`RecipeStore`] that also knows the sellable products.
pub trait ProductStore: RecipeStore {
    /// Loads the product called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such product exists, or another
    /// [`StoreError`] if its definition is malformed.
    fn product_definition(&mut self, name: &str) -> Result<Rc<ProductDefinition>, StoreError>;
}

pub(crate) fn check_price(ingredient: &BaseIngredient) -> Result<(), StoreError> {
    if ingredient.unit_price.is_finite() && ingredient.unit_price >= 0.0 {
        Ok(())
    } else {
        Err(StoreError::InvalidPrice {
            name: ingredient.name.clone(),
            price: ingredient.unit_price,
        })
    }
}

pub(crate) fn check_product(product: &ProductDefinition) -> Result<(), StoreError> {
    product
        .validate()
        .map_err(|source| StoreError::InvalidProduct {
            name: product.name.clone(),
            source,
        })
}

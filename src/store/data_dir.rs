//! Filesystem-backed store
//!
//! Layout, relative to the data directory:
//!
//! ```text
//! general.yaml
//! ingredients/<catalog>.yaml
//! recipes/<recipe>.yaml
//! products/<product>.yaml
//! orders/<order>.yaml
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_norway::Value;
use tracing::debug;

use crate::{
    ingredients::{BaseIngredient, CatalogFile, IngredientCatalog},
    orders::Order,
    products::ProductDefinition,
    recipes::RecipeDefinition,
    settings::GeneralSettings,
    store::{ConfigKind, ProductStore, RecipeStore, StoreError, check_price, check_product},
};

/// File extension of every definition file.
pub const EXTENSION: &str = "yaml";

/// Name of the settings file at the root of the data directory.
pub const SETTINGS_FILE: &str = "general";

/// A data directory of YAML definition files, read lazily and at most once.
#[derive(Debug)]
pub struct DataDir {
    /// Root of the data directory
    base_path: PathBuf,

    /// Base ingredients, loaded up front
    catalog: IngredientCatalog,

    /// Recipes loaded so far, by name
    recipes: FxHashMap<String, Rc<RecipeDefinition>>,

    /// Products loaded so far, by name
    products: FxHashMap<String, Rc<ProductDefinition>>,
}

impl DataDir {
    /// Create a store over `base_path` with an empty ingredient catalog.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: IngredientCatalog::new(),
            recipes: FxHashMap::default(),
            products: FxHashMap::default(),
        }
    }

    /// Create a store over `base_path` and load the named ingredient catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is missing or malformed.
    pub fn open(base_path: impl Into<PathBuf>, catalog: &str) -> Result<Self, StoreError> {
        let mut store = Self::new(base_path);

        store.load_ingredients(catalog)?;

        Ok(store)
    }

    /// Root of the data directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The base ingredients loaded so far.
    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    /// Load an ingredient catalog from `ingredients/<name>.yaml`, adding to
    /// (and overriding) any ingredients already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed, or prices an
    /// ingredient below zero.
    pub fn load_ingredients(&mut self, name: &str) -> Result<&mut Self, StoreError> {
        let path = self.definition_path("ingredients", name);
        let file: CatalogFile = read_yaml(&path, ConfigKind::Ingredients, name)?;
        let catalog = IngredientCatalog::from(file);

        catalog.iter().try_for_each(check_price)?;

        debug!(catalog = name, ingredients = catalog.len(), "loaded ingredient catalog");

        for ingredient in catalog.iter() {
            self.catalog.insert(ingredient.clone());
        }

        Ok(self)
    }

    /// Read the run-wide settings from `general.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed, or has an unusable VAT factor.
    pub fn settings(&self) -> Result<GeneralSettings, StoreError> {
        let path = self
            .base_path
            .join(SETTINGS_FILE)
            .with_extension(EXTENSION);

        let settings: GeneralSettings = read_yaml(&path, ConfigKind::Settings, SETTINGS_FILE)?;

        if !settings.is_valid() {
            return Err(StoreError::InvalidSettings {
                vat_factor: settings.vat_factor,
            });
        }

        Ok(settings)
    }

    /// Read an order from `orders/<name>.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn order(&self, name: &str) -> Result<Order, StoreError> {
        let path = self.definition_path("orders", name);
        let order: Option<Order> = read_yaml(&path, ConfigKind::Order, name)?;

        Ok(order.unwrap_or_default())
    }

    fn definition_path(&self, directory: &str, name: &str) -> PathBuf {
        self.base_path
            .join(directory)
            .join(format!("{name}.{EXTENSION}"))
    }
}

impl RecipeStore for DataDir {
    fn base_ingredient(&self, name: &str) -> Option<&BaseIngredient> {
        self.catalog.get(name)
    }

    fn recipe_definition(&mut self, name: &str) -> Result<Rc<RecipeDefinition>, StoreError> {
        if let Some(recipe) = self.recipes.get(name) {
            return Ok(Rc::clone(recipe));
        }

        let path = self.definition_path("recipes", name);
        let entries: Option<IndexMap<String, Value>> = read_yaml(&path, ConfigKind::Recipe, name)?;

        let recipe = RecipeDefinition::from_entries(name, entries.unwrap_or_default()).map_err(
            |source| StoreError::InvalidRecipe {
                name: name.to_string(),
                source,
            },
        )?;

        debug!(
            recipe = name,
            components = recipe.components.len(),
            "loaded recipe"
        );

        let recipe = Rc::new(recipe);
        self.recipes.insert(name.to_string(), Rc::clone(&recipe));

        Ok(recipe)
    }
}

impl ProductStore for DataDir {
    fn product_definition(&mut self, name: &str) -> Result<Rc<ProductDefinition>, StoreError> {
        if let Some(product) = self.products.get(name) {
            return Ok(Rc::clone(product));
        }

        let path = self.definition_path("products", name);
        let mut product: ProductDefinition = read_yaml(&path, ConfigKind::Product, name)?;
        name.clone_into(&mut product.name);

        check_product(&product)?;

        debug!(product = name, recipe = %product.recipe, "loaded product");

        let product = Rc::new(product);
        self.products.insert(name.to_string(), Rc::clone(&product));

        Ok(product)
    }
}

fn read_yaml<T: DeserializeOwned>(
    path: &Path,
    kind: ConfigKind,
    name: &str,
) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            debug!(path = %path.display(), "definition file missing");

            StoreError::NotFound {
                kind,
                name: name.to_string(),
            }
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_norway::from_str(&contents).map_err(|source| StoreError::Syntax {
        path: path.to_path_buf(),
        source,
    })
}

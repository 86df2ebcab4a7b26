//! Ingredients

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A leaf of every recipe tree, priced directly by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseIngredient {
    /// Ingredient name, unique within the catalog
    #[serde(skip)]
    pub name: String,

    /// Price per unit of mass
    #[serde(rename = "price")]
    pub unit_price: f64,
}

impl BaseIngredient {
    /// Creates a new base ingredient.
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit_price,
        }
    }

    /// Cost of `quantity` units of this ingredient.
    pub fn cost(&self, quantity: f64) -> f64 {
        self.unit_price * quantity
    }
}

/// Base ingredient catalog, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientCatalog {
    ingredients: IndexMap<String, BaseIngredient>,
}

impl IngredientCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ingredient, replacing any previous entry with the same name.
    pub fn insert(&mut self, ingredient: BaseIngredient) {
        self.ingredients.insert(ingredient.name.clone(), ingredient);
    }

    /// Looks up an ingredient by name.
    pub fn get(&self, name: &str) -> Option<&BaseIngredient> {
        self.ingredients.get(name)
    }

    /// Returns true if `name` is priced by this catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.ingredients.contains_key(name)
    }

    /// Iterate over the ingredients in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &BaseIngredient> {
        self.ingredients.values()
    }

    /// Number of ingredients in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

impl FromIterator<BaseIngredient> for IngredientCatalog {
    fn from_iter<I: IntoIterator<Item = BaseIngredient>>(iter: I) -> Self {
        let mut catalog = Self::new();

        for ingredient in iter {
            catalog.insert(ingredient);
        }

        catalog
    }
}

/// Catalog file contents: ingredient name -> `{ price }`
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct CatalogFile(pub IndexMap<String, BaseIngredient>);

impl From<CatalogFile> for IngredientCatalog {
    fn from(file: CatalogFile) -> Self {
        file.0
            .into_iter()
            .map(|(name, ingredient)| BaseIngredient { name, ..ingredient })
            .collect()
    }
}

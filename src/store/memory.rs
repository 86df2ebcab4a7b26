//! In-memory store

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{
    ingredients::{BaseIngredient, IngredientCatalog},
    products::ProductDefinition,
    recipes::RecipeDefinition,
    store::{ConfigKind, ProductStore, RecipeStore, StoreError, check_price, check_product},
};

/// A store whose definitions are inserted up front, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: IngredientCatalog,
    recipes: FxHashMap<String, Rc<RecipeDefinition>>,
    products: FxHashMap<String, Rc<ProductDefinition>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a base ingredient.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPrice`] if the price is negative or not finite.
    pub fn add_ingredient(&mut self, ingredient: BaseIngredient) -> Result<&mut Self, StoreError> {
        check_price(&ingredient)?;

        self.catalog.insert(ingredient);

        Ok(self)
    }

    /// Add a composite recipe, keyed by its name.
    pub fn add_recipe(&mut self, recipe: RecipeDefinition) -> &mut Self {
        self.recipes.insert(recipe.name.clone(), Rc::new(recipe));

        self
    }

    /// Add a product, keyed by its name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidProduct`] if the product fails validation.
    pub fn add_product(&mut self, product: ProductDefinition) -> Result<&mut Self, StoreError> {
        check_product(&product)?;

        self.products.insert(product.name.clone(), Rc::new(product));

        Ok(self)
    }

    /// The base ingredient catalog.
    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }
}

impl RecipeStore for MemoryStore {
    fn base_ingredient(&self, name: &str) -> Option<&BaseIngredient> {
        self.catalog.get(name)
    }

    fn recipe_definition(&mut self, name: &str) -> Result<Rc<RecipeDefinition>, StoreError> {
        self.recipes
            .get(name)
            .map(Rc::clone)
            .ok_or_else(|| StoreError::NotFound {
                kind: ConfigKind::Recipe,
                name: name.to_string(),
            })
    }
}

impl ProductStore for MemoryStore {
    fn product_definition(&mut self, name: &str) -> Result<Rc<ProductDefinition>, StoreError> {
        self.products
            .get(name)
            .map(Rc::clone)
            .ok_or_else(|| StoreError::NotFound {
                kind: ConfigKind::Product,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn serves_what_was_added() -> TestResult {
        let mut store = MemoryStore::new();

        store
            .add_ingredient(BaseIngredient::new("flour", 1.0))?
            .add_recipe(RecipeDefinition::from_weights("dough", [("flour", 1.0)])?)
            .add_product(ProductDefinition::new("roll", "dough", 0.08))?;

        assert!(store.base_ingredient("flour").is_some(), "flour was added");
        assert_eq!(store.recipe_definition("dough")?.name, "dough");
        assert_eq!(store.product_definition("roll")?.recipe, "dough");

        Ok(())
    }

    #[test]
    fn unknown_names_are_not_found() {
        let mut store = MemoryStore::new();

        assert!(
            store
                .recipe_definition("ghost")
                .is_err_and(|e| e.is_not_found()),
            "unknown recipe"
        );
        assert!(
            store
                .product_definition("ghost")
                .is_err_and(|e| e.is_not_found()),
            "unknown product"
        );
    }

    #[test]
    fn rejects_negative_prices() {
        let mut store = MemoryStore::new();

        let result = store.add_ingredient(BaseIngredient::new("flour", -0.5));

        assert!(
            matches!(result, Err(StoreError::InvalidPrice { .. })),
            "negative price accepted"
        );
    }
}

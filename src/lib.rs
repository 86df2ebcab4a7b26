//! Fournil
//!
//! Fournil computes the raw-material cost and gross margin of bakery products
//! whose recipes are trees of nested sub-recipes written as relative weights.
//!
//! A [`run::CostingRun`] reads orders, resolves each ordered product's root
//! recipe through a [`resolver::Resolver`] against a [`store::ProductStore`],
//! and assembles a [`report::Report`] of per-product figures and per-recipe
//! aggregates.

pub mod ingredients;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod recipes;
pub mod report;
pub mod resolver;
pub mod run;
pub mod settings;
pub mod store;

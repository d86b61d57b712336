//! Crafting system for PowerTools.

pub mod grid;
pub mod recipes;

pub use grid::{CraftingGrid, GRID_SLOTS};
pub use recipes::{EMPTY_CELL, Ingredient, RecipeDefinition, RecipeEngine, Registration, ShapedRecipe};

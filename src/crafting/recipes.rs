//! PowerTool recipes: definitions, matching against a grid, and consumption.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::grid::{CraftingGrid, GRID_SLOTS};
use crate::error::{PowerError, PowerResult};
use crate::tools::{ToolCatalog, ToolEntry};

/// Letter marking an empty cell in a recipe shape
pub const EMPTY_CELL: char = ' ';

/// One required item in a recipe slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,
    pub count: u32,
}

impl Ingredient {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    /// Parse `ITEM` or `ITEM*count`
    pub fn parse(spec: &str) -> Option<Self> {
        let (item, count) = match spec.split_once('*') {
            Some((item, count)) => (item.trim(), count.trim().parse().ok()?),
            None => (spec.trim(), 1),
        };
        if item.is_empty() || count == 0 || item.contains(char::is_whitespace) {
            return None;
        }
        Some(Self::new(item, count))
    }

    /// Inverse of [`Ingredient::parse`]
    pub fn spec(&self) -> String {
        if self.count == 1 {
            self.item.clone()
        } else {
            format!("{}*{}", self.item, self.count)
        }
    }
}

/// A recipe producing one PowerTool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDefinition {
    /// Tool name, also the registry key
    pub tool: String,
    /// Row-major 3×3 layout; `None` leaves the slot unconstrained
    pub slots: [Option<Ingredient>; GRID_SLOTS],
    /// Item identity produced
    pub result: String,
}

/// Persisted form of a recipe: a shape of letters plus a letter legend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapedRecipe {
    pub shape: Vec<String>,
    pub ingredients: BTreeMap<String, String>,
}

impl ShapedRecipe {
    /// Assign letters `a`, `b`, ... row-major, one per distinct ingredient
    pub fn from_slots(slots: &[Option<Ingredient>]) -> Self {
        let mut legend: Vec<(String, char)> = Vec::new();
        let mut cells = String::with_capacity(slots.len());

        for slot in slots {
            let letter = match slot {
                None => EMPTY_CELL,
                Some(ingredient) => {
                    let spec = ingredient.spec();
                    match legend.iter().find(|(s, _)| *s == spec) {
                        Some((_, letter)) => *letter,
                        None => {
                            let letter = (b'a' + legend.len() as u8) as char;
                            legend.push((spec, letter));
                            letter
                        }
                    }
                }
            };
            cells.push(letter);
        }

        let chars: Vec<char> = cells.chars().collect();
        let shape = chars
            .chunks(3)
            .map(|row| row.iter().collect::<String>())
            .collect();
        let ingredients = legend
            .into_iter()
            .map(|(spec, letter)| (letter.to_string(), spec))
            .collect();
        Self { shape, ingredients }
    }
}

impl RecipeDefinition {
    /// Build from explicit slots. Anything but nine slots is rejected.
    pub fn new(tool: impl Into<String>, slots: Vec<Option<Ingredient>>) -> PowerResult<Self> {
        let tool = tool.into();
        let count = slots.len();
        let slots: [Option<Ingredient>; GRID_SLOTS] =
            slots.try_into().map_err(|_| PowerError::RecipeInvalid {
                tool: tool.clone(),
                reason: format!("expected {} slots, got {}", GRID_SLOTS, count),
            })?;
        Ok(Self {
            result: tool.clone(),
            tool,
            slots,
        })
    }

    /// Build from the persisted shape/legend form
    pub fn from_shaped(tool: &str, shaped: &ShapedRecipe) -> PowerResult<Self> {
        let invalid = |reason: String| PowerError::RecipeInvalid {
            tool: tool.to_string(),
            reason,
        };

        if shaped.shape.len() != 3 {
            return Err(invalid(format!("shape has {} rows, expected 3", shaped.shape.len())));
        }

        let mut slots = Vec::with_capacity(GRID_SLOTS);
        for row in &shaped.shape {
            if row.chars().count() != 3 {
                return Err(invalid(format!("shape row `{}` is not 3 wide", row)));
            }
            for letter in row.chars() {
                if letter == EMPTY_CELL {
                    slots.push(None);
                    continue;
                }
                let spec = shaped
                    .ingredients
                    .get(&letter.to_string())
                    .ok_or_else(|| invalid(format!("letter `{}` has no ingredient", letter)))?;
                let ingredient = Ingredient::parse(spec).ok_or_else(|| PowerError::ConfigInvalid {
                    key: format!("recipes.{}.ingredients.{}", tool, letter),
                    reason: format!("`{}` is not ITEM[*count]", spec),
                })?;
                slots.push(Some(ingredient));
            }
        }

        Self::new(tool, slots)
    }

    pub fn to_shaped(&self) -> ShapedRecipe {
        ShapedRecipe::from_slots(&self.slots)
    }

    /// The built-in recipe for a catalog tool: base item in the centre, tier
    /// marker on the four edges, corners empty
    pub fn default_for(entry: &ToolEntry) -> Self {
        let marker = || Some(Ingredient::new(entry.marker_item, 1));
        Self {
            tool: entry.name.clone(),
            slots: [
                None,
                marker(),
                None,
                marker(),
                Some(Ingredient::new(entry.base_item.clone(), 1)),
                marker(),
                None,
                marker(),
                None,
            ],
            result: entry.name.clone(),
        }
    }

    /// Whether this recipe alone is fulfilled by the grid
    pub fn check(&self, grid: &CraftingGrid) -> PowerResult<()> {
        match self.compare(grid) {
            SlotComparison::Match => Ok(()),
            SlotComparison::Short { slot, available } => Err(self.missing(slot, available)),
            SlotComparison::Mismatch => Err(PowerError::RecipeInvalid {
                tool: self.tool.clone(),
                reason: "grid no longer holds this recipe".to_string(),
            }),
        }
    }

    /// Every constrained slot holds the expected item, counts aside
    pub fn fills_shape(&self, grid: &CraftingGrid) -> bool {
        self.slots.iter().enumerate().all(|(slot, expected)| match expected {
            None => true,
            Some(expected) => grid.get(slot).is_some_and(|item| item.identity() == expected.item),
        })
    }

    fn missing(&self, slot: usize, available: u32) -> PowerError {
        let (item, required) = self.slots[slot]
            .as_ref()
            .map(|i| (i.item.clone(), i.count))
            .unwrap_or_default();
        PowerError::MissingIngredient {
            tool: self.tool.clone(),
            slot,
            item,
            required,
            available,
        }
    }

    /// Compare against a grid without touching it
    fn compare(&self, grid: &CraftingGrid) -> SlotComparison {
        let mut anchored = false;
        let mut first_short = None;

        for (slot, expected) in self.slots.iter().enumerate() {
            let Some(expected) = expected else {
                continue;
            };
            match grid.get(slot) {
                None => {
                    first_short.get_or_insert((slot, 0));
                }
                Some(item) if item.identity() != expected.item => return SlotComparison::Mismatch,
                Some(item) => {
                    anchored = true;
                    if item.amount < expected.count {
                        first_short.get_or_insert((slot, item.amount));
                    }
                }
            }
        }

        match first_short {
            None if anchored => SlotComparison::Match,
            Some((slot, available)) if anchored => SlotComparison::Short { slot, available },
            _ => SlotComparison::Mismatch,
        }
    }
}

enum SlotComparison {
    Match,
    Short { slot: usize, available: u32 },
    Mismatch,
}

/// Whether a registration took effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    DuplicateSkipped,
}

/// Registry of all PowerTool recipes
#[derive(Debug, Clone, Default)]
pub struct RecipeEngine {
    recipes: BTreeMap<String, RecipeDefinition>,
}

impl RecipeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe; an existing key is left alone
    pub fn register(&mut self, def: RecipeDefinition) -> Registration {
        if self.recipes.contains_key(&def.tool) {
            warn!("Recipe for {} already registered, skipping", def.tool);
            return Registration::DuplicateSkipped;
        }
        debug!("Registered recipe for {}", def.tool);
        self.recipes.insert(def.tool.clone(), def);
        Registration::Registered
    }

    /// Remove a recipe. Returns whether anything was removed.
    pub fn unregister(&mut self, tool: &str) -> bool {
        self.recipes.remove(tool).is_some()
    }

    /// One recipe per catalog tool
    pub fn load_defaults(&mut self, catalog: &ToolCatalog) {
        for entry in catalog.entries() {
            self.register(RecipeDefinition::default_for(entry));
        }
    }

    /// Get a recipe by tool name
    pub fn get(&self, tool: &str) -> Option<&RecipeDefinition> {
        self.recipes.get(tool)
    }

    /// Get all recipes
    pub fn all_recipes(&self) -> impl Iterator<Item = &RecipeDefinition> {
        self.recipes.values()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Find the recipe a grid fulfils.
    ///
    /// `Ok(None)` means the grid has nothing to do with any PowerTool recipe.
    /// A grid that lines up with a recipe but is short somewhere yields
    /// `MissingIngredient` for the first short slot, unless another recipe
    /// matches completely.
    pub fn match_grid(&self, grid: &CraftingGrid) -> PowerResult<Option<&RecipeDefinition>> {
        let mut shortfall = None;

        for def in self.recipes.values() {
            match def.compare(grid) {
                SlotComparison::Match => return Ok(Some(def)),
                SlotComparison::Short { slot, available } => {
                    shortfall.get_or_insert((def, slot, available));
                }
                SlotComparison::Mismatch => {}
            }
        }

        match shortfall {
            Some((def, slot, available)) => Err(def.missing(slot, available)),
            None => Ok(None),
        }
    }

    /// Remove the ingredients of `def` from the grid. Only valid after
    /// [`RecipeEngine::match_grid`] returned `def` for this grid.
    pub fn consume(grid: &mut CraftingGrid, def: &RecipeDefinition) {
        for (slot, expected) in def.slots.iter().enumerate() {
            let Some(expected) = expected else {
                continue;
            };
            let Some(cell) = grid.get_mut(slot) else {
                continue;
            };
            if let Some(item) = cell {
                item.amount = item.amount.saturating_sub(expected.count);
                if item.amount == 0 {
                    *cell = None;
                }
            }
        }
    }
}

//! The 3×3 crafting grid.

use serde::{Deserialize, Serialize};

use crate::tools::ItemStack;

/// Number of slots in a crafting grid
pub const GRID_SLOTS: usize = 9;

/// Input slots of a crafting table, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingGrid {
    slots: [Option<ItemStack>; GRID_SLOTS],
}

impl CraftingGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: [Option<ItemStack>; GRID_SLOTS]) -> Self {
        Self { slots }
    }

    /// Put an item into a slot, replacing whatever was there
    pub fn with(mut self, slot: usize, item: ItemStack) -> Self {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(item);
        }
        self
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Option<ItemStack>> {
        self.slots.get_mut(slot)
    }

    pub fn clear(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    pub fn slots(&self) -> &[Option<ItemStack>; GRID_SLOTS] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn contains_power_tool(&self) -> bool {
        self.slots.iter().flatten().any(ItemStack::is_power_tool)
    }
}

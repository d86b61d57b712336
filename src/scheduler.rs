//! One-tick deferral of craft ingredient consumption.
//!
//! The host updates the crafting inventory after the craft event returns, so
//! ingredients are taken on the following tick. A pending consumption can only
//! be created by [`ConsumptionQueue::schedule`] and is used up when applied;
//! it cannot be pushed back for another tick.

use std::collections::VecDeque;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::crafting::{CraftingGrid, RecipeDefinition, RecipeEngine};
use crate::error::PowerResult;

/// Ingredients waiting to be taken from an actor's grid
#[derive(Debug, Clone)]
pub struct PendingConsumption {
    actor: Uuid,
    recipe: RecipeDefinition,
    due_tick: u64,
}

impl PendingConsumption {
    pub fn actor(&self) -> Uuid {
        self.actor
    }

    pub fn recipe(&self) -> &RecipeDefinition {
        &self.recipe
    }

    pub fn due_tick(&self) -> u64 {
        self.due_tick
    }

    /// Take the ingredients. The grid is re-checked first; if it changed in
    /// the meantime nothing is taken.
    pub fn apply(self, grid: &mut CraftingGrid) -> PowerResult<()> {
        if let Err(err) = self.recipe.check(grid) {
            warn!("Skipping deferred consumption for {}: {}", self.recipe.tool, err);
            return Err(err);
        }
        RecipeEngine::consume(grid, &self.recipe);
        debug!("Consumed ingredients for {}", self.recipe.tool);
        Ok(())
    }
}

/// Queue of consumptions due on a later tick
#[derive(Debug, Default)]
pub struct ConsumptionQueue {
    pending: VecDeque<PendingConsumption>,
}

impl ConsumptionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer consumption to exactly `now + 1`
    pub fn schedule(&mut self, actor: Uuid, recipe: RecipeDefinition, now: u64) {
        self.pending.push_back(PendingConsumption {
            actor,
            recipe,
            due_tick: now + 1,
        });
    }

    /// Remove and return everything due at or before `tick`
    pub fn take_due(&mut self, tick: u64) -> Vec<PendingConsumption> {
        let (due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_tick <= tick);
        self.pending = later.into();
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

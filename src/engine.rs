use rand::Rng;
use tracing::{debug, info, warn};

use crate::action::{
    ActionContext, ActionOutcome, AffectedBlock, Effect, JobNotifier, RegionProtection, Verdict,
};
use crate::config::{ConfigSchema, Settings};
use crate::crafting::{CraftingGrid, RecipeDefinition, RecipeEngine};
use crate::durability::DurabilityEconomy;
use crate::error::PowerError;
use crate::migration::{ConfigMigrationEngine, MigrationReport};
use crate::permission::{Actor, CapabilityProvider, DenyReason, Permission, PermissionGate};
use crate::region::RegionSelector;
use crate::rules::{BreakKind, CompatibilityRegistry, CompatibilityRules};
use crate::scheduler::{ConsumptionQueue, PendingConsumption};
use crate::tools::{ActionKind, Enchantment, ItemStack, PowerToolId, ToolCatalog, ToolCategory};
use crate::world::{BlockPos, BlockSource, DIRT_PATH, FARMLAND, Face, is_air};
use crate::xp;

/// Host services consulted while an action runs
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub capabilities: &'a dyn CapabilityProvider,
    pub protection: Option<&'a dyn RegionProtection>,
    pub jobs: Option<&'a dyn JobNotifier>,
}

impl<'a> Collaborators<'a> {
    pub fn new(capabilities: &'a dyn CapabilityProvider) -> Self {
        Self {
            capabilities,
            protection: None,
            jobs: None,
        }
    }

    pub fn with_protection(mut self, protection: &'a dyn RegionProtection) -> Self {
        self.protection = Some(protection);
        self
    }

    pub fn with_jobs(mut self, jobs: &'a dyn JobNotifier) -> Self {
        self.jobs = Some(jobs);
        self
    }

    fn can_build(&self, actor: &Actor, pos: BlockPos) -> bool {
        self.protection.is_none_or(|p| p.can_build(actor, pos))
    }
}

/// Result of a craft attempt
#[derive(Debug, Clone, PartialEq)]
pub struct CraftOutcome {
    pub verdict: Verdict,
    /// Item to put in the result slot
    pub result: Option<ItemStack>,
}

impl CraftOutcome {
    fn without_result(verdict: Verdict) -> Self {
        Self {
            verdict,
            result: None,
        }
    }
}

/// Result of an anvil combination
#[derive(Debug, Clone, PartialEq)]
pub struct AnvilOutcome {
    pub verdict: Verdict,
    pub result: Option<ItemStack>,
}

/// Owns everything a running plugin needs and handles intercepted events
pub struct PowerEngine {
    catalog: ToolCatalog,
    registry: CompatibilityRegistry,
    recipes: RecipeEngine,
    settings: Settings,
    selector: RegionSelector,
    economy: DurabilityEconomy,
    pending: ConsumptionQueue,
}

impl PowerEngine {
    pub fn new(
        catalog: ToolCatalog,
        registry: CompatibilityRegistry,
        recipes: RecipeEngine,
        settings: Settings,
    ) -> Self {
        let (mineable, diggable, tillable, pathable) = registry.counts();
        info!(
            "Engine ready: {} recipes, {} mineable, {} diggable, {} tillable, {} pathable",
            recipes.len(),
            mineable,
            diggable,
            tillable,
            pathable
        );
        Self {
            economy: DurabilityEconomy::new(settings.durability_formula),
            selector: RegionSelector::default(),
            pending: ConsumptionQueue::new(),
            catalog,
            registry,
            recipes,
            settings,
        }
    }

    /// Migrate a loaded document and build an engine from the result. The
    /// migrated document is returned so the caller can persist it.
    pub fn from_config(schema: &ConfigSchema) -> (Self, ConfigSchema, MigrationReport) {
        let catalog = ToolCatalog::standard();
        let (migrated, report) = ConfigMigrationEngine::new(&catalog).migrate(schema);

        let mut recipes = RecipeEngine::new();
        for def in migrated.recipes(&catalog) {
            recipes.register(def);
        }
        if recipes.is_empty() {
            debug!("No recipes configured, loading defaults");
            recipes.load_defaults(&catalog);
        }

        let engine = Self::new(catalog, migrated.registry(), recipes, migrated.settings());
        (engine, migrated, report)
    }

    // ==================== Accessors ====================

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &CompatibilityRegistry {
        &self.registry
    }

    pub fn recipes(&self) -> &RecipeEngine {
        &self.recipes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    pub fn rules(&self) -> CompatibilityRules<'_> {
        CompatibilityRules::new(&self.catalog, &self.registry)
    }

    fn gate(&self) -> PermissionGate<'_> {
        PermissionGate::new(&self.catalog)
    }

    /// Ask the host whether `actor` may perform `action` with `tool`
    fn authorize(
        &self,
        capabilities: &dyn CapabilityProvider,
        actor: &Actor,
        tool: PowerToolId,
        action: ActionKind,
    ) -> Result<(), DenyReason> {
        match self.gate().check(capabilities, actor, tool, action) {
            Permission::Allowed => Ok(()),
            Permission::Denied(reason) => {
                if let Err(err) = Permission::Denied(reason.clone()).into_result() {
                    info!("{} refused {}: {}", actor.name, tool.name(), err);
                }
                Err(reason)
            }
        }
    }

    /// Build an action context with the configured radius and depth
    pub fn context(
        &self,
        actor: Actor,
        target: BlockPos,
        target_block: impl Into<String>,
        face: Face,
    ) -> ActionContext {
        ActionContext {
            actor,
            target,
            target_block: target_block.into(),
            face,
            radius: self.settings.radius,
            depth: self.settings.depth,
        }
    }

    // ==================== Break ====================

    /// Break the region around `ctx.target` with the held tool.
    ///
    /// The target itself is left to the host. Each extra block is checked
    /// against the classification, protection, and wear of the tool, in
    /// region order; a tool that breaks ends the action.
    pub fn handle_break<R: Rng>(
        &self,
        ctx: &ActionContext,
        held: &mut Option<ItemStack>,
        world: &dyn BlockSource,
        collab: &Collaborators<'_>,
        rng: &mut R,
    ) -> ActionOutcome {
        let Some(item) = held.as_ref() else {
            return ActionOutcome::pass();
        };
        let Some(tool) = item.power_tool else {
            return ActionOutcome::pass();
        };
        let material = item.material.clone();
        let silk_touch = item.enchantment_level(Enchantment::SilkTouch) > 0;

        if let Err(reason) = self.authorize(collab.capabilities, &ctx.actor, tool, ActionKind::Use) {
            return ActionOutcome::deny(reason);
        }

        let rules = self.rules();
        let Some(kind) = rules.classify_break(&material, &ctx.target_block) else {
            debug!("{} does not affect {}", tool.name(), ctx.target_block);
            return ActionOutcome::pass();
        };

        let region = self.selector.select(ctx.face, ctx.target, ctx.radius, ctx.depth);
        let mut outcome = ActionOutcome::allow(Some(kind));
        if region.is_empty() {
            debug!("{}", PowerError::RegionEmpty);
            return outcome;
        }

        for pos in region {
            if pos == ctx.target {
                continue;
            }
            let Some(block) = world.block_at(pos) else {
                continue;
            };
            if is_air(&block) || !rules.allows(kind, &material, &block) {
                continue;
            }
            if !collab.can_build(&ctx.actor, pos) {
                debug!("{} may not build at {:?}", ctx.actor.name, pos);
                continue;
            }

            if let Some(jobs) = collab.jobs {
                jobs.notify(&ctx.actor, pos, &block);
            }
            if kind == BreakKind::Mine && !silk_touch {
                outcome.xp += xp::roll(&block, rng);
            }
            outcome.affected.push(AffectedBlock {
                pos,
                block,
                replacement: None,
            });

            if self.economy.consume(held, rng).destroyed {
                outcome.effects.push(Effect::ToolBroke { tool: tool.name() });
                break;
            }
        }

        debug!(
            "{} broke {} extra blocks with {}",
            ctx.actor.name,
            outcome.affected.len(),
            tool.name()
        );
        outcome
    }

    // ==================== Till / Path ====================

    /// Turn the layer around the target into farmland with a Plow
    pub fn handle_till<R: Rng>(
        &self,
        ctx: &ActionContext,
        held: &mut Option<ItemStack>,
        world: &dyn BlockSource,
        collab: &Collaborators<'_>,
        rng: &mut R,
    ) -> ActionOutcome {
        let rules = self.rules();
        self.convert_layer(ctx, held, world, collab, rng, ToolCategory::Plow, FARMLAND, |tool, block| {
            rules.can_plow_till(tool, block)
        })
    }

    /// Turn the layer around the target into dirt path with an Excavator
    pub fn handle_path<R: Rng>(
        &self,
        ctx: &ActionContext,
        held: &mut Option<ItemStack>,
        world: &dyn BlockSource,
        collab: &Collaborators<'_>,
        rng: &mut R,
    ) -> ActionOutcome {
        let rules = self.rules();
        self.convert_layer(ctx, held, world, collab, rng, ToolCategory::Excavator, DIRT_PATH, |tool, block| {
            rules.can_excavator_path(tool, block)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_layer<R: Rng>(
        &self,
        ctx: &ActionContext,
        held: &mut Option<ItemStack>,
        world: &dyn BlockSource,
        collab: &Collaborators<'_>,
        rng: &mut R,
        category: ToolCategory,
        replacement: &str,
        convertible: impl Fn(&str, &str) -> bool,
    ) -> ActionOutcome {
        let Some(item) = held.as_ref() else {
            return ActionOutcome::pass();
        };
        let Some(tool) = item.power_tool.filter(|id| id.category == category) else {
            return ActionOutcome::pass();
        };
        let material = item.material.clone();
        if !convertible(&material, &ctx.target_block) {
            return ActionOutcome::pass();
        }

        if let Err(reason) = self.authorize(collab.capabilities, &ctx.actor, tool, ActionKind::Use) {
            return ActionOutcome::deny(reason);
        }

        let mut outcome = ActionOutcome::allow(None);
        for pos in self.selector.select_farm(ctx.face, ctx.target, ctx.radius) {
            if pos == ctx.target {
                continue;
            }
            let Some(block) = world.block_at(pos) else {
                continue;
            };
            if !convertible(&material, &block) {
                continue;
            }
            let above = BlockPos::new(pos.x, pos.y + 1, pos.z);
            if !world.block_at(above).is_some_and(|b| is_air(&b)) {
                continue;
            }
            if !collab.can_build(&ctx.actor, pos) {
                continue;
            }

            outcome.affected.push(AffectedBlock {
                pos,
                block,
                replacement: Some(replacement.to_string()),
            });
            if self.economy.consume(held, rng).destroyed {
                outcome.effects.push(Effect::ToolBroke { tool: tool.name() });
                break;
            }
        }
        outcome
    }

    // ==================== Crafting ====================

    /// Decide a craft and schedule ingredient consumption for the next tick.
    ///
    /// `proposed` is the result the host's own recipe lookup came up with.
    /// A vanilla result passes untouched; a PowerTool result must agree with
    /// its configured recipe. Without a proposal the grid is matched against
    /// every recipe and only a filled shape short on counts is denied.
    ///
    /// The grid is not modified here; take the due consumptions with
    /// [`PowerEngine::take_due_consumptions`] on the following tick.
    pub fn handle_craft(
        &mut self,
        actor: &Actor,
        grid: &CraftingGrid,
        proposed: Option<&ItemStack>,
        tick: u64,
        capabilities: &dyn CapabilityProvider,
    ) -> CraftOutcome {
        let def = match proposed.map(|item| item.power_tool) {
            Some(Some(tool)) => match self.proposed_recipe(tool, grid) {
                Ok(def) => def,
                Err(reason) => return CraftOutcome::without_result(Verdict::Deny(reason)),
            },
            Some(None) => return CraftOutcome::without_result(self.vanilla_verdict(grid)),
            None => match self.recipes.match_grid(grid) {
                Ok(Some(def)) => def.clone(),
                Ok(None) | Err(_) => {
                    return CraftOutcome::without_result(self.unmatched_verdict(grid));
                }
            },
        };

        match self.catalog.resolve(&def.result) {
            Ok(id) => {
                if let Err(reason) = self.authorize(capabilities, actor, id, ActionKind::Craft) {
                    return CraftOutcome::without_result(Verdict::Deny(reason));
                }
            }
            Err(err) => warn!("{}", err),
        }

        let result = self.catalog.create_item_named(&def.result);
        info!("{} crafted {}", actor.name, def.tool);
        self.pending.schedule(actor.id, def, tick);
        CraftOutcome {
            verdict: Verdict::Allow,
            result: Some(result),
        }
    }

    /// Recipe behind a PowerTool the host offered for `grid`
    fn proposed_recipe(
        &self,
        tool: PowerToolId,
        grid: &CraftingGrid,
    ) -> Result<RecipeDefinition, DenyReason> {
        let name = tool.name();
        let Some(def) = self.recipes.get(&name) else {
            warn!("No recipe registered for {}", name);
            return Err(DenyReason::RecipeMismatch { tool: name });
        };
        match def.check(grid) {
            Ok(()) => Ok(def.clone()),
            Err(PowerError::MissingIngredient { slot, item, .. }) => {
                debug!("Grid for {} is short of {} in slot {}", name, item, slot);
                Err(DenyReason::MissingIngredient { tool: name, slot })
            }
            Err(err) => {
                debug!("{}", err);
                Err(DenyReason::RecipeMismatch { tool: name })
            }
        }
    }

    /// Verdict for a grid no recipe matches completely
    fn unmatched_verdict(&self, grid: &CraftingGrid) -> Verdict {
        let shortfall = self
            .recipes
            .all_recipes()
            .filter(|def| def.fills_shape(grid))
            .find_map(|def| match def.check(grid) {
                Err(PowerError::MissingIngredient { tool, slot, item, .. }) => {
                    debug!("Grid for {} is short of {} in slot {}", tool, item, slot);
                    Some(DenyReason::MissingIngredient { tool, slot })
                }
                _ => None,
            });
        match shortfall {
            Some(reason) => Verdict::Deny(reason),
            None => self.vanilla_verdict(grid),
        }
    }

    /// A craft with no PowerTool result
    fn vanilla_verdict(&self, grid: &CraftingGrid) -> Verdict {
        if grid.contains_power_tool() {
            Verdict::Deny(DenyReason::PowerToolIngredient)
        } else {
            Verdict::Pass
        }
    }

    /// Consumptions due at `tick`. Apply each to its actor's grid.
    pub fn take_due_consumptions(&mut self, tick: u64) -> Vec<PendingConsumption> {
        self.pending.take_due(tick)
    }

    pub fn pending_consumptions(&self) -> usize {
        self.pending.len()
    }

    // ==================== Enchanting / Anvil ====================

    pub fn handle_enchant(
        &self,
        actor: &Actor,
        item: &ItemStack,
        capabilities: &dyn CapabilityProvider,
    ) -> Verdict {
        let Some(tool) = item.power_tool else {
            return Verdict::Pass;
        };
        match self.authorize(capabilities, actor, tool, ActionKind::Enchant) {
            Ok(()) => Verdict::Allow,
            Err(reason) => Verdict::Deny(reason),
        }
    }

    /// Check an anvil combination and keep the PowerTool tag on the result
    pub fn handle_anvil(
        &self,
        left: &ItemStack,
        right: &ItemStack,
        proposed: Option<ItemStack>,
    ) -> AnvilOutcome {
        let tool = match (left.power_tool, right.power_tool) {
            (None, None) => {
                return AnvilOutcome {
                    verdict: Verdict::Pass,
                    result: proposed,
                };
            }
            (Some(a), Some(b)) if a == b => a,
            (Some(a), None) if !is_damageable(right) => a,
            _ => {
                debug!("Refusing anvil combination of {} and {}", left.identity(), right.identity());
                return AnvilOutcome {
                    verdict: Verdict::Deny(DenyReason::IncompatibleAnvilInputs),
                    result: None,
                };
            }
        };

        AnvilOutcome {
            verdict: Verdict::Allow,
            result: proposed.map(|item| retag(item, tool)),
        }
    }
}

fn is_damageable(item: &ItemStack) -> bool {
    item.max_durability > 0
}

fn retag(mut item: ItemStack, tool: PowerToolId) -> ItemStack {
    item.power_tool = Some(tool);
    item
}

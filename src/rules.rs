//! Tool/block compatibility.
//!
//! Blocks are grouped into four registries. A block may be mineable only by a
//! whitelist of tools (e.g. obsidian needs a diamond pickaxe); an absent
//! whitelist means any hammer will do.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::tools::{ToolCatalog, ToolCategory};

/// Block registries, immutable once the engine is built
#[derive(Debug, Clone, Default)]
pub struct CompatibilityRegistry {
    mineable: HashMap<String, Option<HashSet<String>>>,
    diggable: HashSet<String>,
    tillable: HashSet<String>,
    pathable: HashSet<String>,
}

impl CompatibilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mineable block. `None` allows any hammer.
    pub fn with_mineable<I, S>(mut self, block: impl Into<String>, tools: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tools = tools.map(|t| t.into_iter().map(Into::into).collect());
        self.mineable.insert(block.into(), tools);
        self
    }

    pub fn with_diggable(mut self, block: impl Into<String>) -> Self {
        self.diggable.insert(block.into());
        self
    }

    pub fn with_tillable(mut self, block: impl Into<String>) -> Self {
        self.tillable.insert(block.into());
        self
    }

    pub fn with_pathable(mut self, block: impl Into<String>) -> Self {
        self.pathable.insert(block.into());
        self
    }

    pub fn is_mineable(&self, block: &str) -> bool {
        self.mineable.contains_key(block)
    }

    /// Whitelist for a mineable block; `None` if the block is unrestricted or
    /// not mineable at all
    pub fn mineable_whitelist(&self, block: &str) -> Option<&HashSet<String>> {
        self.mineable.get(block).and_then(Option::as_ref)
    }

    pub fn is_diggable(&self, block: &str) -> bool {
        self.diggable.contains(block)
    }

    pub fn is_tillable(&self, block: &str) -> bool {
        self.tillable.contains(block)
    }

    pub fn is_pathable(&self, block: &str) -> bool {
        self.pathable.contains(block)
    }

    /// Registry sizes, for startup logging
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.mineable.len(),
            self.diggable.len(),
            self.tillable.len(),
            self.pathable.len(),
        )
    }
}

/// How a break action is classified. An action is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakKind {
    Mine,
    Dig,
}

/// Predicates over the catalog and the registries
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityRules<'a> {
    catalog: &'a ToolCatalog,
    registry: &'a CompatibilityRegistry,
}

impl<'a> CompatibilityRules<'a> {
    pub fn new(catalog: &'a ToolCatalog, registry: &'a CompatibilityRegistry) -> Self {
        Self { catalog, registry }
    }

    /// `tool` is the vanilla item a tool is built on, e.g. `IRON_PICKAXE`
    pub fn can_hammer_mine(&self, tool: &str, block: &str) -> bool {
        let Some(whitelist) = self.registry.mineable.get(block) else {
            return false;
        };
        self.catalog.is_base_item(ToolCategory::Hammer, tool)
            && whitelist.as_ref().is_none_or(|tools| tools.contains(tool))
    }

    pub fn can_excavator_dig(&self, tool: &str, block: &str) -> bool {
        self.registry.is_diggable(block) && self.catalog.is_base_item(ToolCategory::Excavator, tool)
    }

    pub fn can_plow_till(&self, tool: &str, block: &str) -> bool {
        self.registry.is_tillable(block) && self.catalog.is_base_item(ToolCategory::Plow, tool)
    }

    /// Path making converts the block rather than removing it
    pub fn can_excavator_path(&self, tool: &str, block: &str) -> bool {
        self.registry.is_pathable(block) && self.catalog.is_base_item(ToolCategory::Excavator, tool)
    }

    /// Hammer rule first, then excavator rule
    pub fn classify_break(&self, tool: &str, block: &str) -> Option<BreakKind> {
        if self.can_hammer_mine(tool, block) {
            Some(BreakKind::Mine)
        } else if self.can_excavator_dig(tool, block) {
            Some(BreakKind::Dig)
        } else {
            None
        }
    }

    /// Whether `block` may be broken under an already chosen classification
    pub fn allows(&self, kind: BreakKind, tool: &str, block: &str) -> bool {
        match kind {
            BreakKind::Mine => self.can_hammer_mine(tool, block),
            BreakKind::Dig => self.can_excavator_dig(tool, block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CompatibilityRegistry {
        CompatibilityRegistry::new()
            .with_mineable("STONE", None::<Vec<String>>)
            .with_mineable("OBSIDIAN", Some(["DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]))
            .with_diggable("DIRT")
            .with_diggable("GRAVEL")
            .with_tillable("DIRT")
            .with_pathable("GRASS_BLOCK")
    }

    #[test]
    fn test_hammer_rule() {
        let catalog = ToolCatalog::standard();
        let registry = registry();
        let rules = CompatibilityRules::new(&catalog, &registry);

        assert!(rules.can_hammer_mine("WOODEN_PICKAXE", "STONE"));
        assert!(!rules.can_hammer_mine("WOODEN_SHOVEL", "STONE"));
        assert!(!rules.can_hammer_mine("IRON_PICKAXE", "OBSIDIAN"));
        assert!(rules.can_hammer_mine("DIAMOND_PICKAXE", "OBSIDIAN"));
        assert!(!rules.can_hammer_mine("DIAMOND_PICKAXE", "DIRT"));
    }

    #[test]
    fn test_whitelist_must_also_be_a_pickaxe() {
        let catalog = ToolCatalog::standard();
        let registry =
            CompatibilityRegistry::new().with_mineable("GLASS", Some(["DIAMOND_SHOVEL"]));
        let rules = CompatibilityRules::new(&catalog, &registry);
        assert!(!rules.can_hammer_mine("DIAMOND_SHOVEL", "GLASS"));
    }

    #[test]
    fn test_excavator_and_plow_rules() {
        let catalog = ToolCatalog::standard();
        let registry = registry();
        let rules = CompatibilityRules::new(&catalog, &registry);

        assert!(rules.can_excavator_dig("STONE_SHOVEL", "GRAVEL"));
        assert!(!rules.can_excavator_dig("STONE_PICKAXE", "GRAVEL"));
        assert!(rules.can_plow_till("GOLDEN_HOE", "DIRT"));
        assert!(!rules.can_plow_till("GOLDEN_HOE", "GRAVEL"));
        assert!(rules.can_excavator_path("IRON_SHOVEL", "GRASS_BLOCK"));
        assert!(!rules.can_excavator_path("IRON_HOE", "GRASS_BLOCK"));
    }

    #[test]
    fn test_classification_is_exclusive() {
        let catalog = ToolCatalog::standard();
        let registry = registry().with_diggable("STONE");
        let rules = CompatibilityRules::new(&catalog, &registry);

        assert_eq!(rules.classify_break("IRON_PICKAXE", "STONE"), Some(BreakKind::Mine));
        assert_eq!(rules.classify_break("IRON_SHOVEL", "STONE"), Some(BreakKind::Dig));
        assert_eq!(rules.classify_break("IRON_HOE", "STONE"), None);
        assert!(!rules.allows(BreakKind::Mine, "IRON_PICKAXE", "DIRT"));
        assert!(rules.allows(BreakKind::Dig, "IRON_SHOVEL", "DIRT"));
    }

    #[test]
    fn test_every_tool_block_pair_matches_definition() {
        let catalog = ToolCatalog::standard();
        let registry = registry();
        let rules = CompatibilityRules::new(&catalog, &registry);
        let blocks = ["STONE", "OBSIDIAN", "DIRT", "GRAVEL", "GRASS_BLOCK", "BEDROCK"];

        for entry in catalog.entries() {
            let tool = entry.base_item.as_str();
            let is_pickaxe = catalog.is_base_item(ToolCategory::Hammer, tool);
            for block in blocks {
                let expected = registry.is_mineable(block)
                    && registry
                        .mineable_whitelist(block)
                        .is_none_or(|w| w.contains(tool))
                    && is_pickaxe;
                assert_eq!(rules.can_hammer_mine(tool, block), expected, "{tool} on {block}");
            }
        }
    }
}

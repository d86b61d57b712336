//! Tool categories, tiers and the static catalog.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::item::ItemStack;
use crate::error::{PowerError, PowerResult};

/// Kinds of PowerTools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolCategory {
    /// Area mining, built on a pickaxe
    Hammer,
    /// Area digging and path making, built on a shovel
    Excavator,
    /// Area tilling, built on a hoe
    Plow,
}

/// Material grade of a tool, ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Wooden,
    Stone,
    Iron,
    Golden,
    Diamond,
    Netherite,
}

/// What an actor is trying to do with a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Craft,
    Use,
    Enchant,
}

impl ToolCategory {
    /// Fixed canonical order
    pub fn all() -> &'static [ToolCategory] {
        &[ToolCategory::Hammer, ToolCategory::Excavator, ToolCategory::Plow]
    }

    /// Upper-case name used in tool identities
    pub fn name(&self) -> &'static str {
        match self {
            ToolCategory::Hammer => "HAMMER",
            ToolCategory::Excavator => "EXCAVATOR",
            ToolCategory::Plow => "PLOW",
        }
    }

    /// Vanilla tool kind the category is built on
    pub fn base_kind(&self) -> &'static str {
        match self {
            ToolCategory::Hammer => "PICKAXE",
            ToolCategory::Excavator => "SHOVEL",
            ToolCategory::Plow => "HOE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HAMMER" => Some(ToolCategory::Hammer),
            "EXCAVATOR" => Some(ToolCategory::Excavator),
            "PLOW" => Some(ToolCategory::Plow),
            _ => None,
        }
    }
}

impl Tier {
    /// Tiers in ascending order
    pub fn all() -> &'static [Tier] {
        &[
            Tier::Wooden,
            Tier::Stone,
            Tier::Iron,
            Tier::Golden,
            Tier::Diamond,
            Tier::Netherite,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Wooden => "WOODEN",
            Tier::Stone => "STONE",
            Tier::Iron => "IRON",
            Tier::Golden => "GOLDEN",
            Tier::Diamond => "DIAMOND",
            Tier::Netherite => "NETHERITE",
        }
    }

    /// Uses before a tool of this tier breaks
    pub fn max_durability(&self) -> u32 {
        match self {
            Tier::Wooden => 59,
            Tier::Stone => 131,
            Tier::Iron => 250,
            Tier::Golden => 32,
            Tier::Diamond => 1561,
            Tier::Netherite => 2031,
        }
    }

    /// Material that marks the tier in the default recipes
    pub fn marker_item(&self) -> &'static str {
        match self {
            Tier::Wooden => "OAK_PLANKS",
            Tier::Stone => "COBBLESTONE",
            Tier::Iron => "IRON_INGOT",
            Tier::Golden => "GOLD_INGOT",
            Tier::Diamond => "DIAMOND",
            Tier::Netherite => "NETHERITE_INGOT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "WOODEN" | "WOOD" => Some(Tier::Wooden),
            "STONE" => Some(Tier::Stone),
            "IRON" => Some(Tier::Iron),
            "GOLDEN" | "GOLD" => Some(Tier::Golden),
            "DIAMOND" => Some(Tier::Diamond),
            "NETHERITE" => Some(Tier::Netherite),
            _ => None,
        }
    }
}

impl ActionKind {
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Craft => "craft",
            ActionKind::Use => "use",
            ActionKind::Enchant => "enchant",
        }
    }
}

/// Identity of a PowerTool: one category, one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerToolId {
    pub category: ToolCategory,
    pub tier: Tier,
}

impl PowerToolId {
    pub fn new(category: ToolCategory, tier: Tier) -> Self {
        Self { category, tier }
    }

    /// Tool name, e.g. `IRON_HAMMER`
    pub fn name(&self) -> String {
        format!("{}_{}", self.tier.name(), self.category.name())
    }

    /// Vanilla item the tool is built on, e.g. `IRON_PICKAXE`
    pub fn base_item(&self) -> String {
        format!("{}_{}", self.tier.name(), self.category.base_kind())
    }

    /// `powermining.<verb>.<category>.<tier>`
    pub fn permission(&self, action: ActionKind) -> String {
        format!(
            "powermining.{}.{}.{}",
            action.verb(),
            self.category.name().to_lowercase(),
            self.tier.name().to_lowercase()
        )
    }

    /// Parse a tool name such as `DIAMOND_EXCAVATOR`
    pub fn parse(s: &str) -> Option<Self> {
        let (tier, category) = s.rsplit_once('_')?;
        Some(Self::new(ToolCategory::parse(category)?, Tier::parse(tier)?))
    }

    /// Position in canonical catalog order
    fn index(&self) -> usize {
        self.category as usize * Tier::all().len() + self.tier as usize
    }
}

/// Permission strings derived for one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    pub craft: String,
    pub use_: String,
    pub enchant: String,
}

impl PermissionSet {
    pub fn get(&self, action: ActionKind) -> &str {
        match action {
            ActionKind::Craft => &self.craft,
            ActionKind::Use => &self.use_,
            ActionKind::Enchant => &self.enchant,
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct ToolEntry {
    pub id: PowerToolId,
    pub name: String,
    pub base_item: String,
    pub marker_item: &'static str,
    pub max_durability: u32,
    pub permissions: PermissionSet,
}

impl ToolEntry {
    fn new(id: PowerToolId) -> Self {
        Self {
            id,
            name: id.name(),
            base_item: id.base_item(),
            marker_item: id.tier.marker_item(),
            max_durability: id.tier.max_durability(),
            permissions: PermissionSet {
                craft: id.permission(ActionKind::Craft),
                use_: id.permission(ActionKind::Use),
                enchant: id.permission(ActionKind::Enchant),
            },
        }
    }
}

/// Item handed out when a tool name cannot be resolved
pub const PLACEHOLDER_ITEM: &str = "BARRIER";

/// Registry of every PowerTool, immutable after construction
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    entries: Vec<ToolEntry>,
}

impl ToolCatalog {
    /// Every category crossed with every tier, in canonical order
    pub fn standard() -> Self {
        let entries = ToolCategory::all()
            .iter()
            .flat_map(|&category| {
                Tier::all()
                    .iter()
                    .map(move |&tier| ToolEntry::new(PowerToolId::new(category, tier)))
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, id: PowerToolId) -> &ToolEntry {
        &self.entries[id.index()]
    }

    /// Entries in canonical order: Hammer, Excavator, Plow; tiers ascending
    pub fn entries(&self) -> impl Iterator<Item = &ToolEntry> {
        self.entries.iter()
    }

    pub fn resolve(&self, name: &str) -> PowerResult<PowerToolId> {
        PowerToolId::parse(name).ok_or_else(|| PowerError::UnknownTool(name.to_string()))
    }

    /// Vanilla items a category is built on (the "pickaxe tier set" for hammers)
    pub fn base_items(&self, category: ToolCategory) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.id.category == category)
            .map(|e| e.base_item.as_str())
    }

    pub fn is_base_item(&self, category: ToolCategory, material: &str) -> bool {
        self.base_items(category).any(|b| b == material)
    }

    /// A fresh, undamaged PowerTool
    pub fn create_item(&self, id: PowerToolId) -> ItemStack {
        let entry = self.entry(id);
        ItemStack::power_tool(id, &entry.base_item, entry.max_durability)
    }

    /// Resolve by name; unknown names yield a placeholder instead of failing
    pub fn create_item_named(&self, name: &str) -> ItemStack {
        match self.resolve(name) {
            Ok(id) => self.create_item(id),
            Err(err) => {
                warn!("{}, handing out placeholder", err);
                ItemStack::new(PLACEHOLDER_ITEM, 1)
            }
        }
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_combination() {
        let catalog = ToolCatalog::standard();
        assert_eq!(catalog.entries().count(), 18);
        for entry in catalog.entries() {
            assert_eq!(catalog.entry(entry.id).name, entry.name);
        }
    }

    #[test]
    fn test_names_and_base_items() {
        let id = PowerToolId::new(ToolCategory::Hammer, Tier::Iron);
        assert_eq!(id.name(), "IRON_HAMMER");
        assert_eq!(id.base_item(), "IRON_PICKAXE");
        assert_eq!(PowerToolId::parse("IRON_HAMMER"), Some(id));
        assert_eq!(
            PowerToolId::parse("NETHERITE_EXCAVATOR"),
            Some(PowerToolId::new(ToolCategory::Excavator, Tier::Netherite))
        );
        assert_eq!(PowerToolId::parse("IRON_SWORD"), None);
        assert_eq!(PowerToolId::parse("HAMMER"), None);
    }

    #[test]
    fn test_permission_strings() {
        let id = PowerToolId::new(ToolCategory::Plow, Tier::Diamond);
        assert_eq!(id.permission(ActionKind::Use), "powermining.use.plow.diamond");
        assert_eq!(id.permission(ActionKind::Craft), "powermining.craft.plow.diamond");
        let catalog = ToolCatalog::standard();
        assert_eq!(
            catalog.entry(id).permissions.get(ActionKind::Enchant),
            "powermining.enchant.plow.diamond"
        );
    }

    #[test]
    fn test_canonical_order() {
        let catalog = ToolCatalog::standard();
        let names: Vec<_> = catalog.entries().map(|e| e.name.clone()).collect();
        assert_eq!(names[0], "WOODEN_HAMMER");
        assert_eq!(names[5], "NETHERITE_HAMMER");
        assert_eq!(names[6], "WOODEN_EXCAVATOR");
        assert_eq!(names[17], "NETHERITE_PLOW");
        let ids: Vec<_> = catalog.entries().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_base_item_membership() {
        let catalog = ToolCatalog::standard();
        assert!(catalog.is_base_item(ToolCategory::Hammer, "DIAMOND_PICKAXE"));
        assert!(!catalog.is_base_item(ToolCategory::Hammer, "DIAMOND_SHOVEL"));
        assert!(catalog.is_base_item(ToolCategory::Plow, "WOODEN_HOE"));
    }

    #[test]
    fn test_unknown_tool_gets_placeholder() {
        let catalog = ToolCatalog::standard();
        let item = catalog.create_item_named("COPPER_HAMMER");
        assert_eq!(item.material, PLACEHOLDER_ITEM);
        assert!(item.power_tool.is_none());

        let item = catalog.create_item_named("GOLDEN_PLOW");
        assert_eq!(item.material, "GOLDEN_HOE");
        assert_eq!(item.max_durability, 32);
    }
}

//! Item stacks as seen by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::PowerToolId;

/// Enchantments the engine cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Enchantment {
    Unbreaking,
    SilkTouch,
    Fortune,
    Efficiency,
    Mending,
}

impl Enchantment {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase().replace(['-', ' '], "_");
        match s.as_str() {
            "unbreaking" | "durability" => Some(Enchantment::Unbreaking),
            "silk_touch" => Some(Enchantment::SilkTouch),
            "fortune" | "loot_bonus_blocks" => Some(Enchantment::Fortune),
            "efficiency" | "dig_speed" => Some(Enchantment::Efficiency),
            "mending" => Some(Enchantment::Mending),
            _ => None,
        }
    }
}

/// A stack of items. PowerTools carry their identity as an explicit tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: String,
    pub amount: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_tool: Option<PowerToolId>,
    /// Accumulated damage
    #[serde(default)]
    pub damage: u32,
    /// Zero for items that cannot be damaged
    #[serde(default)]
    pub max_durability: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enchantments: BTreeMap<Enchantment, u8>,
}

impl ItemStack {
    /// A plain stack of a material
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            power_tool: None,
            damage: 0,
            max_durability: 0,
            enchantments: BTreeMap::new(),
        }
    }

    /// An undamaged vanilla tool
    pub fn tool(material: impl Into<String>, max_durability: u32) -> Self {
        Self {
            max_durability,
            ..Self::new(material, 1)
        }
    }

    /// An undamaged PowerTool built on `base_item`
    pub fn power_tool(id: PowerToolId, base_item: &str, max_durability: u32) -> Self {
        Self {
            power_tool: Some(id),
            ..Self::tool(base_item, max_durability)
        }
    }

    pub fn with_enchantment(mut self, enchantment: Enchantment, level: u8) -> Self {
        self.enchantments.insert(enchantment, level);
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    /// Identity used when matching recipe slots: the tool name for
    /// PowerTools, the material otherwise
    pub fn identity(&self) -> String {
        match self.power_tool {
            Some(id) => id.name(),
            None => self.material.clone(),
        }
    }

    pub fn is_power_tool(&self) -> bool {
        self.power_tool.is_some()
    }

    /// Level of an enchantment, zero if absent
    pub fn enchantment_level(&self, enchantment: Enchantment) -> u8 {
        self.enchantments.get(&enchantment).copied().unwrap_or(0)
    }

    /// Uses left before the tool breaks
    pub fn remaining_uses(&self) -> u32 {
        self.max_durability.saturating_sub(self.damage)
    }
}

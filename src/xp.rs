//! Experience dropped by blocks broken with a hammer.

use rand::Rng;
use serde::Serialize;

/// Blocks that drop experience when mined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum XpCategory {
    CoalOre,
    DiamondOre,
    EmeraldOre,
    LapisOre,
    RedstoneOre,
    NetherQuartzOre,
    NetherGoldOre,
    Spawner,
}

impl XpCategory {
    pub fn all() -> &'static [XpCategory] {
        &[
            XpCategory::CoalOre,
            XpCategory::DiamondOre,
            XpCategory::EmeraldOre,
            XpCategory::LapisOre,
            XpCategory::RedstoneOre,
            XpCategory::NetherQuartzOre,
            XpCategory::NetherGoldOre,
            XpCategory::Spawner,
        ]
    }

    /// Category of a block identity, `None` for blocks without experience
    pub fn of(block: &str) -> Option<Self> {
        let base = block.strip_prefix("DEEPSLATE_").unwrap_or(block);
        match base {
            "COAL_ORE" => Some(XpCategory::CoalOre),
            "DIAMOND_ORE" => Some(XpCategory::DiamondOre),
            "EMERALD_ORE" => Some(XpCategory::EmeraldOre),
            "LAPIS_ORE" => Some(XpCategory::LapisOre),
            "REDSTONE_ORE" => Some(XpCategory::RedstoneOre),
            "NETHER_QUARTZ_ORE" => Some(XpCategory::NetherQuartzOre),
            "NETHER_GOLD_ORE" => Some(XpCategory::NetherGoldOre),
            "SPAWNER" => Some(XpCategory::Spawner),
            _ => None,
        }
    }
}

/// Inclusive experience range per category
pub const XP_TABLE: &[(XpCategory, u32, u32)] = &[
    (XpCategory::CoalOre, 0, 2),
    (XpCategory::DiamondOre, 3, 7),
    (XpCategory::EmeraldOre, 3, 7),
    (XpCategory::LapisOre, 2, 5),
    (XpCategory::RedstoneOre, 1, 5),
    (XpCategory::NetherQuartzOre, 2, 5),
    (XpCategory::NetherGoldOre, 0, 1),
    (XpCategory::Spawner, 15, 43),
];

/// Range for a category
pub fn range(category: XpCategory) -> (u32, u32) {
    XP_TABLE
        .iter()
        .find(|(c, _, _)| *c == category)
        .map(|&(_, min, max)| (min, max))
        .unwrap_or((0, 0))
}

/// Experience for breaking `block`
pub fn roll<R: Rng>(block: &str, rng: &mut R) -> u32 {
    match XpCategory::of(block) {
        Some(category) => {
            let (min, max) = range(category);
            rng.random_range(min..=max)
        }
        None => 0,
    }
}

//! Durability consumption with Unbreaking mitigation.
//!
//! Two mitigation formulas are supported and selected in config:
//! - `die-roll`: damage applies on a 1-in-(L+1) roll, so a use is skipped with
//!   probability L/(L+1)
//! - `table`: fixed skip chances of 50%, 33% and 25% for levels 1, 2 and 3+

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tools::{Enchantment, ItemStack};

/// Which Unbreaking formula applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurabilityFormula {
    #[default]
    DieRoll,
    Table,
}

impl DurabilityFormula {
    /// Probability that a single use leaves the tool undamaged
    pub fn skip_chance(&self, level: u8) -> f64 {
        if level == 0 {
            return 0.0;
        }
        match self {
            DurabilityFormula::DieRoll => level as f64 / (level as f64 + 1.0),
            DurabilityFormula::Table => match level {
                1 => 0.5,
                2 => 1.0 / 3.0,
                _ => 0.25,
            },
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "die-roll" | "dieroll" => Some(DurabilityFormula::DieRoll),
            "table" => Some(DurabilityFormula::Table),
            _ => None,
        }
    }
}

/// Result of one durability consumption
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DurabilityOutcome {
    pub damaged: bool,
    /// The tool broke and was removed from the holder's slot
    pub destroyed: bool,
}

/// Applies wear to held tools
#[derive(Debug, Clone, Copy, Default)]
pub struct DurabilityEconomy {
    formula: DurabilityFormula,
}

impl DurabilityEconomy {
    pub fn new(formula: DurabilityFormula) -> Self {
        Self { formula }
    }

    pub fn formula(&self) -> DurabilityFormula {
        self.formula
    }

    /// Use the tool in `slot` once. A tool left with no remaining uses is
    /// taken out of the slot.
    pub fn consume<R: Rng>(
        &self,
        slot: &mut Option<ItemStack>,
        rng: &mut R,
    ) -> DurabilityOutcome {
        let Some(tool) = slot.as_mut() else {
            return DurabilityOutcome::default();
        };
        if tool.max_durability == 0 {
            return DurabilityOutcome::default();
        }

        let level = tool.enchantment_level(Enchantment::Unbreaking);
        if self.skips_damage(level, rng) {
            return DurabilityOutcome::default();
        }

        tool.damage += 1;
        let destroyed = tool.remaining_uses() == 0;
        if destroyed {
            debug!("{} broke after {} uses", tool.identity(), tool.damage);
            *slot = None;
        }
        DurabilityOutcome {
            damaged: true,
            destroyed,
        }
    }

    fn skips_damage<R: Rng>(&self, level: u8, rng: &mut R) -> bool {
        if level == 0 {
            return false;
        }
        match self.formula {
            DurabilityFormula::DieRoll => rng.random_range(0..=u32::from(level)) != 0,
            DurabilityFormula::Table => rng.random::<f64>() < self.formula.skip_chance(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn observed_skip_rate(formula: DurabilityFormula, level: u8) -> f64 {
        let economy = DurabilityEconomy::new(formula);
        let mut rng = StdRng::seed_from_u64(7);
        let runs = 10_000;
        let mut slot = Some(
            ItemStack::tool("NETHERITE_PICKAXE", u32::MAX)
                .with_enchantment(Enchantment::Unbreaking, level),
        );
        let mut skipped = 0;
        for _ in 0..runs {
            if !economy.consume(&mut slot, &mut rng).damaged {
                skipped += 1;
            }
        }
        skipped as f64 / runs as f64
    }

    #[test]
    fn test_no_enchantment_always_damages() {
        let economy = DurabilityEconomy::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut slot = Some(ItemStack::tool("IRON_PICKAXE", 250));
        for expected in 1..=10 {
            let outcome = economy.consume(&mut slot, &mut rng);
            assert!(outcome.damaged);
            assert_eq!(slot.as_ref().map(|t| t.damage), Some(expected));
        }
    }

    #[test]
    fn test_one_unit_of_headroom_before_destruction() {
        let economy = DurabilityEconomy::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut slot = Some(ItemStack::tool("WOODEN_PICKAXE", 59).with_damage(57));

        let first = economy.consume(&mut slot, &mut rng);
        assert!(first.damaged && !first.destroyed);
        assert_eq!(slot.as_ref().map(|t| t.damage), Some(58));

        let second = economy.consume(&mut slot, &mut rng);
        assert!(second.damaged && second.destroyed);
        assert!(slot.is_none());
    }

    #[test]
    fn test_empty_slot_and_undamageable_items() {
        let economy = DurabilityEconomy::default();
        let mut rng = StdRng::seed_from_u64(1);

        let mut empty: Option<ItemStack> = None;
        assert_eq!(economy.consume(&mut empty, &mut rng), DurabilityOutcome::default());

        let mut stick = Some(ItemStack::new("STICK", 1));
        assert!(!economy.consume(&mut stick, &mut rng).damaged);
        assert_eq!(stick.map(|s| s.damage), Some(0));
    }

    #[test]
    fn test_damage_is_monotonic() {
        let economy = DurabilityEconomy::new(DurabilityFormula::Table);
        let mut rng = StdRng::seed_from_u64(99);
        let mut slot = Some(
            ItemStack::tool("DIAMOND_SHOVEL", 1561).with_enchantment(Enchantment::Unbreaking, 3),
        );
        let mut last = 0;
        for _ in 0..500 {
            economy.consume(&mut slot, &mut rng);
            let damage = slot.as_ref().map(|t| t.damage).unwrap_or(u32::MAX);
            assert!(damage >= last);
            last = damage;
        }
    }

    #[test]
    fn test_die_roll_skip_rate_at_level_two() {
        let rate = observed_skip_rate(DurabilityFormula::DieRoll, 2);
        assert!((rate - 2.0 / 3.0).abs() < 0.02, "observed {rate}");
        assert!((rate - 1.0 / 3.0).abs() > 0.02);
    }

    #[test]
    fn test_table_skip_rate_at_level_two() {
        let rate = observed_skip_rate(DurabilityFormula::Table, 2);
        assert!((rate - 1.0 / 3.0).abs() < 0.02, "observed {rate}");
        assert!((rate - 2.0 / 3.0).abs() > 0.02);
    }

    #[test]
    fn test_skip_chance_table() {
        assert_eq!(DurabilityFormula::DieRoll.skip_chance(0), 0.0);
        assert_eq!(DurabilityFormula::DieRoll.skip_chance(1), 0.5);
        assert_eq!(DurabilityFormula::Table.skip_chance(1), 0.5);
        assert_eq!(DurabilityFormula::Table.skip_chance(5), 0.25);
        assert_eq!(DurabilityFormula::parse("die_roll"), Some(DurabilityFormula::DieRoll));
    }
}

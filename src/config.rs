//! Persisted configuration.
//!
//! The file is TOML. It is kept as a loose table because the migration engine
//! has to read shapes that no longer match the current layout; typed views
//! (`Settings`, the compatibility registry, recipes) are extracted from it
//! with malformed entries skipped and logged.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::{Table, Value};
use tracing::warn;

use crate::crafting::{RecipeDefinition, ShapedRecipe};
use crate::durability::DurabilityFormula;
use crate::error::{ConfigError, PowerError};
use crate::rules::CompatibilityRegistry;
use crate::tools::ToolCatalog;

/// Version stamped by the current migration
pub const CONFIG_VERSION: &str = "2";

/// Top-level keys
pub mod keys {
    pub const VERSION: &str = "version";
    pub const RADIUS: &str = "radius";
    pub const DEPTH: &str = "depth";
    pub const MINEABLE: &str = "mineable";
    pub const DIGGABLE: &str = "diggable";
    pub const TILLABLE: &str = "tillable";
    pub const PATHABLE: &str = "pathable";
    pub const RECIPES: &str = "recipes";
    pub const DURABILITY: &str = "durability";
    pub const FORMULA: &str = "formula";

    /// Pre-2 name of `depth`
    pub const LEGACY_DEPTH: &str = "Deep";
    /// Pre-2 flat recipe list
    pub const LEGACY_RECIPES: &str = "Recipes";
}

/// Whitelist value meaning "any hammer"
pub const ANY_TOOL: &str = "any";

const DEFAULT_RADIUS: u32 = 1;
const DEFAULT_DEPTH: u32 = 0;

const DEFAULT_MINEABLE: &[&str] = &[
    "STONE",
    "COBBLESTONE",
    "MOSSY_COBBLESTONE",
    "GRANITE",
    "DIORITE",
    "ANDESITE",
    "DEEPSLATE",
    "COBBLED_DEEPSLATE",
    "TUFF",
    "CALCITE",
    "SANDSTONE",
    "RED_SANDSTONE",
    "NETHERRACK",
    "BASALT",
    "BLACKSTONE",
    "END_STONE",
    "TERRACOTTA",
    "COAL_ORE",
    "DEEPSLATE_COAL_ORE",
    "COPPER_ORE",
    "NETHER_QUARTZ_ORE",
    "NETHER_GOLD_ORE",
    "SPAWNER",
];

/// Mineable blocks restricted to a tool whitelist
const DEFAULT_RESTRICTED: &[(&str, &[&str])] = &[
    ("IRON_ORE", &["STONE_PICKAXE", "IRON_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("LAPIS_ORE", &["STONE_PICKAXE", "IRON_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("GOLD_ORE", &["IRON_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("REDSTONE_ORE", &["IRON_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("DIAMOND_ORE", &["IRON_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("EMERALD_ORE", &["IRON_PICKAXE", "DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("OBSIDIAN", &["DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
    ("ANCIENT_DEBRIS", &["DIAMOND_PICKAXE", "NETHERITE_PICKAXE"]),
];

const DEFAULT_DIGGABLE: &[&str] = &[
    "DIRT",
    "GRASS_BLOCK",
    "COARSE_DIRT",
    "PODZOL",
    "MYCELIUM",
    "ROOTED_DIRT",
    "MUD",
    "SAND",
    "RED_SAND",
    "GRAVEL",
    "CLAY",
    "SOUL_SAND",
    "SOUL_SOIL",
    "SNOW_BLOCK",
    "FARMLAND",
    "DIRT_PATH",
];

const DEFAULT_TILLABLE: &[&str] = &["DIRT", "GRASS_BLOCK", "COARSE_DIRT", "DIRT_PATH", "ROOTED_DIRT"];

const DEFAULT_PATHABLE: &[&str] = &[
    "DIRT",
    "GRASS_BLOCK",
    "COARSE_DIRT",
    "PODZOL",
    "MYCELIUM",
    "ROOTED_DIRT",
];

/// Region and durability settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub radius: u32,
    pub depth: u32,
    pub durability_formula: DurabilityFormula,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            depth: DEFAULT_DEPTH,
            durability_formula: DurabilityFormula::default(),
        }
    }
}

/// The persisted configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    table: Table,
}

impl ConfigSchema {
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// Parse TOML text. A corrupt document is fatal.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let table = text.parse::<Table>().map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Ok(Self { table })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.table)?)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn version(&self) -> Option<&str> {
        self.table.get(keys::VERSION).and_then(Value::as_str)
    }

    /// Values filled in for missing top-level keys
    pub fn defaults() -> Table {
        let mut table = Table::new();
        table.insert(keys::RADIUS.into(), Value::Integer(DEFAULT_RADIUS.into()));
        table.insert(keys::DEPTH.into(), Value::Integer(DEFAULT_DEPTH.into()));

        let mut mineable: Vec<Value> = DEFAULT_MINEABLE.iter().map(|b| Value::from(*b)).collect();
        for (block, tools) in DEFAULT_RESTRICTED {
            let mut entry = Table::new();
            entry.insert((*block).into(), Value::from(tools.to_vec()));
            mineable.push(Value::Table(entry));
        }
        table.insert(keys::MINEABLE.into(), Value::Array(mineable));
        table.insert(keys::DIGGABLE.into(), Value::from(DEFAULT_DIGGABLE.to_vec()));
        table.insert(keys::TILLABLE.into(), Value::from(DEFAULT_TILLABLE.to_vec()));
        table.insert(keys::PATHABLE.into(), Value::from(DEFAULT_PATHABLE.to_vec()));

        let mut durability = Table::new();
        durability.insert(keys::FORMULA.into(), Value::from("die-roll"));
        table.insert(keys::DURABILITY.into(), Value::Table(durability));
        table
    }

    /// Typed settings. Bad values fall back to defaults with a warning.
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        let formula = match self
            .table
            .get(keys::DURABILITY)
            .and_then(|d| d.get(keys::FORMULA))
        {
            None => defaults.durability_formula,
            Some(value) => value
                .as_str()
                .and_then(DurabilityFormula::parse)
                .unwrap_or_else(|| {
                    skip(config_invalid("durability.formula", "expected `die-roll` or `table`"));
                    defaults.durability_formula
                }),
        };
        Settings {
            radius: self.read_u32(keys::RADIUS, defaults.radius),
            depth: self.read_u32(keys::DEPTH, defaults.depth),
            durability_formula: formula,
        }
    }

    fn read_u32(&self, key: &str, default: u32) -> u32 {
        match self.table.get(key) {
            None => default,
            Some(value) => value
                .as_integer()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or_else(|| {
                    skip(config_invalid(key, "expected a non-negative integer"));
                    default
                }),
        }
    }

    /// Build the block registries, skipping malformed entries
    pub fn registry(&self) -> CompatibilityRegistry {
        let mut registry = CompatibilityRegistry::new();

        for (index, entry) in self.list(keys::MINEABLE).iter().enumerate() {
            let key = format!("{}[{}]", keys::MINEABLE, index);
            match entry {
                Value::String(block) => {
                    registry = registry.with_mineable(block.as_str(), None::<Vec<String>>);
                }
                Value::Table(blocks) => {
                    for (block, tools) in blocks {
                        match parse_whitelist(tools) {
                            Some(tools) => registry = registry.with_mineable(block.as_str(), tools),
                            None => skip(config_invalid(
                                &format!("{}.{}", key, block),
                                "expected `any` or a list of tools",
                            )),
                        }
                    }
                }
                _ => skip(config_invalid(&key, "expected a block name or a table")),
            }
        }

        for block in self.block_names(keys::DIGGABLE) {
            registry = registry.with_diggable(block);
        }
        for block in self.block_names(keys::TILLABLE) {
            registry = registry.with_tillable(block);
        }
        for block in self.block_names(keys::PATHABLE) {
            registry = registry.with_pathable(block);
        }
        registry
    }

    /// Structured recipes. Invalid or unknown-tool entries are skipped.
    pub fn recipes(&self, catalog: &ToolCatalog) -> Vec<RecipeDefinition> {
        let Some(table) = self.table.get(keys::RECIPES) else {
            return Vec::new();
        };
        let Some(table) = table.as_table() else {
            skip(config_invalid(keys::RECIPES, "expected a table"));
            return Vec::new();
        };

        let mut recipes = Vec::with_capacity(table.len());
        for (tool, value) in table {
            if let Err(err) = catalog.resolve(tool) {
                skip(err);
                continue;
            }
            let shaped = match value.clone().try_into::<ShapedRecipe>() {
                Ok(shaped) => shaped,
                Err(err) => {
                    skip(config_invalid(&format!("{}.{}", keys::RECIPES, tool), &err.to_string()));
                    continue;
                }
            };
            match RecipeDefinition::from_shaped(tool, &shaped) {
                Ok(def) => recipes.push(def),
                Err(err) => skip(err),
            }
        }
        recipes
    }

    fn list(&self, key: &str) -> &[Value] {
        match self.table.get(key) {
            Some(Value::Array(values)) => values.as_slice(),
            Some(_) => {
                skip(config_invalid(key, "expected a list"));
                &[]
            }
            None => &[],
        }
    }

    fn block_names(&self, key: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for (index, value) in self.list(key).iter().enumerate() {
            match value.as_str() {
                Some(block) if seen.insert(block) => names.push(block.to_string()),
                Some(_) => {}
                None => skip(config_invalid(&format!("{}[{}]", key, index), "expected a block name")),
            }
        }
        names
    }
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self::from_table(Table::new())
    }
}

/// `"any"` → `Some(None)`, a list of names → `Some(Some(names))`
fn parse_whitelist(value: &Value) -> Option<Option<Vec<String>>> {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case(ANY_TOOL) => Some(None),
        Value::Array(tools) => {
            let names: Option<Vec<String>> =
                tools.iter().map(|t| t.as_str().map(str::to_string)).collect();
            names.map(Some)
        }
        _ => None,
    }
}

fn config_invalid(key: &str, reason: &str) -> PowerError {
    PowerError::ConfigInvalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn skip(err: PowerError) {
    warn!("{}, skipping", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(text: &str) -> ConfigSchema {
        ConfigSchema::parse(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn test_settings_defaults_and_overrides() {
        assert_eq!(ConfigSchema::default().settings(), Settings::default());

        let config = schema(
            r#"
            radius = 2
            depth = 3
            [durability]
            formula = "table"
            "#,
        );
        assert_eq!(
            config.settings(),
            Settings {
                radius: 2,
                depth: 3,
                durability_formula: DurabilityFormula::Table
            }
        );
    }

    #[test]
    fn test_bad_settings_fall_back() {
        let config = schema(
            r#"
            radius = -1
            depth = "deep"
            [durability]
            formula = "coin-flip"
            "#,
        );
        assert_eq!(config.settings(), Settings::default());
    }

    #[test]
    fn test_registry_parsing() {
        let config = schema(
            r#"
            mineable = ["STONE", { OBSIDIAN = ["DIAMOND_PICKAXE"] }, { GLASS = "any" }, 42, { BAD = 7 }]
            diggable = ["DIRT", 3, "SAND"]
            tillable = ["DIRT"]
            pathable = ["GRASS_BLOCK"]
            "#,
        );
        let registry = config.registry();
        assert!(registry.is_mineable("STONE"));
        assert!(registry.mineable_whitelist("STONE").is_none());
        assert!(registry.is_mineable("GLASS"));
        assert!(registry.mineable_whitelist("GLASS").is_none());
        assert!(registry
            .mineable_whitelist("OBSIDIAN")
            .is_some_and(|w| w.contains("DIAMOND_PICKAXE")));
        assert!(!registry.is_mineable("BAD"));
        assert_eq!(registry.counts(), (3, 2, 1, 1));
    }

    #[test]
    fn test_default_registry() {
        let registry = ConfigSchema::from_table(ConfigSchema::defaults()).registry();
        assert!(registry.is_mineable("STONE"));
        assert!(registry.mineable_whitelist("OBSIDIAN").is_some());
        assert!(registry.is_diggable("GRAVEL"));
        assert!(registry.is_tillable("GRASS_BLOCK"));
        assert!(registry.is_pathable("PODZOL"));
    }

    #[test]
    fn test_recipe_parsing_skips_bad_entries() {
        let catalog = ToolCatalog::standard();
        let config = schema(
            r#"
            [recipes.IRON_HAMMER]
            shape = [" m ", "mim", " m "]
            ingredients = { m = "IRON_INGOT", i = "IRON_PICKAXE" }

            [recipes.COPPER_HAMMER]
            shape = [" m ", "mim", " m "]
            ingredients = { m = "COPPER_INGOT", i = "STONE_PICKAXE" }

            [recipes.STONE_HAMMER]
            shape = ["mm", "mim", " m "]
            ingredients = { m = "COBBLESTONE", i = "STONE_PICKAXE" }

            [recipes.GOLDEN_HAMMER]
            shape = "nope"
            "#,
        );
        let recipes = config.recipes(&catalog);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].tool, "IRON_HAMMER");
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ConfigSchema::from_table(ConfigSchema::defaults());
        config.save(&path).unwrap();
        let loaded = ConfigSchema::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unreadable_and_corrupt_files_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(ConfigSchema::load(&missing), Err(ConfigError::Io { .. })));

        let corrupt = dir.path().join("corrupt.toml");
        std::fs::write(&corrupt, "radius = [").unwrap();
        assert!(matches!(ConfigSchema::load(&corrupt), Err(ConfigError::Parse { .. })));
    }
}

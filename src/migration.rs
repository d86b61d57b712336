//! Upgrade of older configuration layouts.
//!
//! Migration is a pure transform from one table to a new one. Running it on
//! an already current document returns an equal copy.

use serde::Serialize;
use toml::{Table, Value};
use tracing::{debug, info, warn};

use crate::config::{CONFIG_VERSION, ConfigSchema, keys};
use crate::crafting::{GRID_SLOTS, Ingredient, ShapedRecipe};
use crate::error::{PowerError, PowerResult};
use crate::tools::{PowerToolId, ToolCatalog};

/// Marks an empty slot in the legacy recipe list
pub const LEGACY_EMPTY: &str = "AIR";

/// Whether a document already has the current layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MigrationState {
    Unmigrated,
    Migrated,
}

/// What a migration changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    /// Top-level keys filled from defaults
    pub filled: Vec<String>,
    /// Legacy keys moved to their current names
    pub renamed: Vec<(String, String)>,
    /// Legacy recipes converted to the structured form
    pub converted: Vec<String>,
    /// Recipes dropped because no such tool exists
    pub dropped: Vec<String>,
    /// Entries that could not be read
    #[serde(skip)]
    pub skipped: Vec<PowerError>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.filled.is_empty()
            && self.renamed.is_empty()
            && self.converted.is_empty()
            && self.dropped.is_empty()
            && self.skipped.is_empty()
    }
}

/// Brings configuration documents up to [`CONFIG_VERSION`]
#[derive(Debug, Clone, Copy)]
pub struct ConfigMigrationEngine<'a> {
    catalog: &'a ToolCatalog,
}

impl<'a> ConfigMigrationEngine<'a> {
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        Self { catalog }
    }

    pub fn state(schema: &ConfigSchema) -> MigrationState {
        if schema.version() == Some(CONFIG_VERSION) {
            MigrationState::Migrated
        } else {
            MigrationState::Unmigrated
        }
    }

    /// Produce the current-layout document for `schema`
    pub fn migrate(&self, schema: &ConfigSchema) -> (ConfigSchema, MigrationReport) {
        let mut report = MigrationReport::default();
        if Self::state(schema) == MigrationState::Migrated {
            debug!("Config already at version {}", CONFIG_VERSION);
            return (schema.clone(), report);
        }

        let input = schema.table();
        let mut out = Table::new();
        out.insert(keys::VERSION.into(), Value::from(CONFIG_VERSION));
        for (key, value) in input {
            if matches!(key.as_str(), keys::VERSION | keys::LEGACY_DEPTH | keys::LEGACY_RECIPES) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }

        // Legacy depth, unless the current key is already set
        if let Some(depth) = input.get(keys::LEGACY_DEPTH) {
            if input.contains_key(keys::DEPTH) {
                warn!("Both `{}` and `{}` set, keeping `{}`", keys::LEGACY_DEPTH, keys::DEPTH, keys::DEPTH);
            } else {
                out.insert(keys::DEPTH.into(), depth.clone());
                report
                    .renamed
                    .push((keys::LEGACY_DEPTH.to_string(), keys::DEPTH.to_string()));
            }
        }

        for (key, value) in ConfigSchema::defaults() {
            if !out.contains_key(&key) {
                out.insert(key.clone(), value);
                report.filled.push(key);
            }
        }

        let recipes = self.migrate_recipes(input, &mut report);
        out.insert(keys::RECIPES.into(), Value::Table(recipes));

        info!(
            "Migrated config to version {}: {} filled, {} recipes converted, {} dropped",
            CONFIG_VERSION,
            report.filled.len(),
            report.converted.len(),
            report.dropped.len()
        );
        (ConfigSchema::from_table(out), report)
    }

    /// Merge structured and legacy recipes, drop unknown tools, order canonically
    fn migrate_recipes(&self, input: &Table, report: &mut MigrationReport) -> Table {
        // (tool, recipe, converted from the legacy list)
        let mut entries: Vec<(String, Value, bool)> = match input.get(keys::RECIPES) {
            Some(Value::Table(existing)) => existing
                .iter()
                .map(|(tool, value)| (tool.clone(), value.clone(), false))
                .collect(),
            Some(_) => {
                self.skip(
                    report,
                    PowerError::ConfigInvalid {
                        key: keys::RECIPES.to_string(),
                        reason: "expected a table".to_string(),
                    },
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        match input.get(keys::LEGACY_RECIPES) {
            Some(Value::Array(legacy)) => {
                for (index, entry) in legacy.iter().enumerate() {
                    match convert_legacy(index, entry) {
                        Ok((tool, _)) if entries.iter().any(|(t, _, _)| *t == tool) => {
                            debug!("Keeping structured recipe for {} over legacy entry", tool);
                        }
                        Ok((tool, value)) => entries.push((tool, value, true)),
                        Err(err) => self.skip(report, err),
                    }
                }
            }
            Some(_) => self.skip(
                report,
                PowerError::ConfigInvalid {
                    key: keys::LEGACY_RECIPES.to_string(),
                    reason: "expected a list".to_string(),
                },
            ),
            None => {}
        }

        let mut ranked: Vec<(PowerToolId, Value)> = Vec::with_capacity(entries.len());
        for (tool, value, legacy) in entries {
            let id = match self.catalog.resolve(&tool) {
                Ok(id) => id,
                Err(err) => {
                    warn!("{}, dropping recipe", err);
                    report.dropped.push(tool);
                    continue;
                }
            };
            if ranked.iter().any(|(seen, _)| *seen == id) {
                debug!("Duplicate recipe for {} under `{}`, keeping the first", id.name(), tool);
                continue;
            }
            if legacy {
                report.converted.push(tool);
            }
            ranked.push((id, value));
        }
        // category-major, tiers ascending
        ranked.sort_by_key(|(id, _)| *id);
        ranked.into_iter().map(|(id, value)| (id.name(), value)).collect()
    }

    fn skip(&self, report: &mut MigrationReport, err: PowerError) {
        warn!("{}, skipping", err);
        report.skipped.push(err);
    }
}

/// `{ TOOL = [nine item names] }` to `(TOOL, structured recipe)`
fn convert_legacy(index: usize, entry: &Value) -> PowerResult<(String, Value)> {
    let key = format!("{}[{}]", keys::LEGACY_RECIPES, index);
    let invalid = |reason: String| PowerError::ConfigInvalid {
        key: key.clone(),
        reason,
    };

    let table = entry
        .as_table()
        .filter(|t| t.len() == 1)
        .ok_or_else(|| invalid("expected a single `TOOL = [...]` entry".to_string()))?;
    let Some((tool, items)) = table.iter().next() else {
        return Err(invalid("empty entry".to_string()));
    };
    let items = items
        .as_array()
        .filter(|items| items.len() == GRID_SLOTS)
        .ok_or_else(|| invalid(format!("{} needs exactly {} items", tool, GRID_SLOTS)))?;

    let mut slots = Vec::with_capacity(GRID_SLOTS);
    for item in items {
        let name = item
            .as_str()
            .ok_or_else(|| invalid(format!("{} has a non-text item", tool)))?;
        if name.is_empty() || name.eq_ignore_ascii_case(LEGACY_EMPTY) {
            slots.push(None);
            continue;
        }
        let ingredient = Ingredient::parse(name)
            .ok_or_else(|| invalid(format!("{} has unreadable item `{}`", tool, name)))?;
        slots.push(Some(ingredient));
    }

    let value = Value::try_from(ShapedRecipe::from_slots(&slots))
        .map_err(|err| invalid(err.to_string()))?;
    Ok((tool.clone(), value))
}

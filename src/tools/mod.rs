//! PowerTool catalog and item model.

pub mod catalog;
pub mod item;

pub use catalog::{
    ActionKind, PLACEHOLDER_ITEM, PermissionSet, PowerToolId, Tier, ToolCatalog, ToolCategory,
    ToolEntry,
};
pub use item::{Enchantment, ItemStack};

//! Permission gating for PowerTool actions.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::PowerError;
use crate::tools::{ActionKind, PowerToolId, ToolCatalog};

/// Someone performing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Host-side permission lookup
pub trait CapabilityProvider {
    fn has_capability(&self, actor: &Actor, permission: &str) -> bool;
}

/// Grants everything. Useful for consoles and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl CapabilityProvider for AllowAll {
    fn has_capability(&self, _actor: &Actor, _permission: &str) -> bool {
        true
    }
}

/// Why an action was denied. The host maps these to localized messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DenyReason {
    NoCraftPermission { permission: String },
    NoUsePermission { permission: String },
    NoEnchantPermission { permission: String },
    /// A grid agreed with a recipe except for a short slot
    MissingIngredient { tool: String, slot: usize },
    /// The host offered a PowerTool the grid does not make
    RecipeMismatch { tool: String },
    /// A PowerTool was placed in a grid that makes no PowerTool
    PowerToolIngredient,
    /// Anvil inputs that would lose or forge a PowerTool
    IncompatibleAnvilInputs,
}

impl DenyReason {
    /// Stable key for message lookup
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NoCraftPermission { .. } => "no-craft-permission",
            DenyReason::NoUsePermission { .. } => "no-use-permission",
            DenyReason::NoEnchantPermission { .. } => "no-enchant-permission",
            DenyReason::MissingIngredient { .. } => "missing-ingredient",
            DenyReason::RecipeMismatch { .. } => "recipe-mismatch",
            DenyReason::PowerToolIngredient => "power-tool-ingredient",
            DenyReason::IncompatibleAnvilInputs => "incompatible-anvil-inputs",
        }
    }
}

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    Allowed,
    Denied(DenyReason),
}

impl Permission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Permission::Allowed)
    }

}

/// Derives permission strings and asks the host about them
#[derive(Debug, Clone, Copy)]
pub struct PermissionGate<'a> {
    catalog: &'a ToolCatalog,
}

impl<'a> PermissionGate<'a> {
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        Self { catalog }
    }

    pub fn check(
        &self,
        provider: &dyn CapabilityProvider,
        actor: &Actor,
        tool: PowerToolId,
        action: ActionKind,
    ) -> Permission {
        let permission = self.catalog.entry(tool).permissions.get(action);
        if provider.has_capability(actor, permission) {
            return Permission::Allowed;
        }

        debug!("{} lacks {}", actor.name, permission);
        let permission = permission.to_string();
        Permission::Denied(match action {
            ActionKind::Craft => DenyReason::NoCraftPermission { permission },
            ActionKind::Use => DenyReason::NoUsePermission { permission },
            ActionKind::Enchant => DenyReason::NoEnchantPermission { permission },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tier, ToolCategory};
    use std::collections::HashSet;

    struct Granted(HashSet<String>);

    impl CapabilityProvider for Granted {
        fn has_capability(&self, _actor: &Actor, permission: &str) -> bool {
            self.0.contains(permission)
        }
    }

    #[test]
    fn test_check_uses_derived_permission() {
        let catalog = ToolCatalog::standard();
        let gate = PermissionGate::new(&catalog);
        let actor = Actor::new(Uuid::new_v4(), "steve");
        let provider = Granted(["powermining.use.hammer.iron".to_string()].into_iter().collect());
        let hammer = PowerToolId::new(ToolCategory::Hammer, Tier::Iron);

        assert_eq!(gate.check(&provider, &actor, hammer, ActionKind::Use), Permission::Allowed);
        assert_eq!(
            gate.check(&provider, &actor, hammer, ActionKind::Craft),
            Permission::Denied(DenyReason::NoCraftPermission {
                permission: "powermining.craft.hammer.iron".to_string()
            })
        );

        let diamond = PowerToolId::new(ToolCategory::Hammer, Tier::Diamond);
        assert!(!gate.check(&provider, &actor, diamond, ActionKind::Use).is_allowed());
    }

    #[test]
    fn test_denied_converts_to_error() {
        let denied = Permission::Denied(DenyReason::NoEnchantPermission {
            permission: "powermining.enchant.plow.stone".to_string(),
        });
        assert_eq!(
            denied.into_result(),
            Err(PowerError::PermissionDenied {
                permission: "powermining.enchant.plow.stone".to_string()
            })
        );
        assert!(Permission::Allowed.into_result().is_ok());
    }

    #[test]
    fn test_allow_all() {
        let catalog = ToolCatalog::standard();
        let gate = PermissionGate::new(&catalog);
        let actor = Actor::new(Uuid::new_v4(), "console");
        let plow = PowerToolId::new(ToolCategory::Plow, Tier::Netherite);
        assert!(gate.check(&AllowAll, &actor, plow, ActionKind::Enchant).is_allowed());
    }
}

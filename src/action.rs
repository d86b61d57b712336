use serde::Serialize;

use crate::permission::{Actor, DenyReason};
use crate::rules::BreakKind;
use crate::world::{BlockPos, Face};

/// A block interaction performed with a held tool
#[derive(Debug, Clone, Serialize)]
pub struct ActionContext {
    pub actor: Actor,
    /// Block the actor hit
    pub target: BlockPos,
    /// Identity of that block
    pub target_block: String,
    /// Face of the target the actor approached from
    pub face: Face,
    pub radius: u32,
    pub depth: u32,
}

/// Host-facing decision for an intercepted event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Proceed with the PowerTool behaviour
    Allow,
    /// Cancel the event
    Deny(DenyReason),
    /// Nothing to do with PowerTools; let the host carry on
    Pass,
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Deny(_))
    }
}

/// Side effects the host should play
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// Held tool broke; play the break sound and clear the hand
    ToolBroke { tool: String },
}

/// A block changed by an action. `None` removes the block with drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedBlock {
    pub pos: BlockPos,
    pub block: String,
    pub replacement: Option<String>,
}

/// Result of a break, till or path action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub verdict: Verdict,
    pub kind: Option<BreakKind>,
    /// In processing order
    pub affected: Vec<AffectedBlock>,
    /// Experience to drop at the target
    pub xp: u32,
    pub effects: Vec<Effect>,
}

impl ActionOutcome {
    pub fn pass() -> Self {
        Self::with_verdict(Verdict::Pass)
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self::with_verdict(Verdict::Deny(reason))
    }

    pub fn allow(kind: Option<BreakKind>) -> Self {
        Self {
            kind,
            ..Self::with_verdict(Verdict::Allow)
        }
    }

    fn with_verdict(verdict: Verdict) -> Self {
        Self {
            verdict,
            kind: None,
            affected: Vec::new(),
            xp: 0,
            effects: Vec::new(),
        }
    }

    pub fn tool_broke(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, Effect::ToolBroke { .. }))
    }
}

/// Host protection check, e.g. claims or spawn protection
pub trait RegionProtection {
    fn can_build(&self, actor: &Actor, pos: BlockPos) -> bool;
}

/// Notified once per extra block broken, for job or quest plugins
pub trait JobNotifier {
    fn notify(&self, actor: &Actor, pos: BlockPos, block: &str);
}

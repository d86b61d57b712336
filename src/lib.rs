//! Area-of-effect PowerTools: hammers mine, excavators dig, plows till.
//!
//! The crate is host-agnostic. A server plugin feeds intercepted events into
//! [`PowerEngine`] and applies the returned outcomes to its world.

pub mod action;
pub mod config;
pub mod crafting;
pub mod durability;
pub mod engine;
pub mod error;
pub mod migration;
pub mod permission;
pub mod region;
pub mod rules;
pub mod scheduler;
pub mod tools;
pub mod world;
pub mod xp;

pub use action::{ActionContext, ActionOutcome, Effect, JobNotifier, RegionProtection, Verdict};
pub use config::{ConfigSchema, Settings};
pub use engine::{AnvilOutcome, Collaborators, CraftOutcome, PowerEngine};
pub use error::{ConfigError, PowerError, PowerResult};
pub use permission::{Actor, CapabilityProvider, DenyReason};
pub use world::{BlockPos, BlockSource, Face};

//! Integration test infrastructure for Kuwaiba sync providers
//!
//! Provides:
//! - Sample device outputs and data source configuration builders
//! - Inventory seeding (devices with their physical ports)
//! - A scripted command runner standing in for SSH
//! - Fault-injecting store and activity log wrappers
//! - Result log and inventory verification helpers

pub mod fixtures;
mod faults;
mod runner;
mod verification;

pub use faults::{FailingActivityLog, FaultyInventory};
pub use fixtures::*;
pub use runner::{RecordedCall, ScriptedRunner};
pub use verification::*;

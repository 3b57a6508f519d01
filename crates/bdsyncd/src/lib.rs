//! bdsyncd - bridge domain synchronization provider for Kuwaiba
//!
//! Polls Cisco devices over SSH, parses their bridge domain configuration
//! and reconciles it with the inventory: missing bridge domains, VFIs, BDIs,
//! service instances and sub-interfaces are created, and every logical
//! interface ends up related to exactly one bridge domain.

mod config;
mod error;
pub mod parser;
mod poller;
mod port_name;
mod provider;
mod reconciler;
mod tables;
mod types;

pub use config::*;
pub use error::{BdSyncError, BdSyncResult};
pub use poller::DevicePoller;
pub use port_name::*;
pub use provider::BridgeDomainSyncProvider;
pub use reconciler::reconcile;
pub use tables::*;
pub use types::*;

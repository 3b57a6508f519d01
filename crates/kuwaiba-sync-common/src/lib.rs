//! Common infrastructure for Kuwaiba synchronization providers.
//!
//! This crate provides what every sync provider shares:
//!
//! - [`remote`]: SSH command execution against managed devices
//! - [`params`]: data source configurations and synchronization groups
//! - [`result`]: the append-only [`SyncResult`] log record
//! - [`provider`]: the [`SyncProvider`] trait and [`PollResponse`]
//! - [`error`]: error taxonomy for polling and reconciliation
//!
//! # Architecture
//!
//! A sync run follows this pattern:
//!
//! 1. `mapped_poll` walks a synchronization group sequentially, polling each
//!    device and parsing its output into provider-specific entities
//! 2. Per-configuration failures are recorded in the [`PollResponse`] and
//!    never stop the batch
//! 3. `sync` reconciles the polled entities against the inventory and
//!    returns one [`SyncResult`] per decision
//!
//! # Example
//!
//! ```ignore
//! use kuwaiba_sync_common::{remote::{self, CommandRunner, SshTarget}, Result};
//!
//! async fn show_bridge_domains(runner: &dyn CommandRunner, target: &SshTarget) -> Result<String> {
//!     remote::exec_or_fail(runner, target, "show bridge-domain").await
//! }
//! ```

pub mod error;
pub mod params;
pub mod provider;
pub mod remote;
pub mod result;

// Re-export commonly used items at crate root
pub use error::{Result, SyncError};
pub use params::{parameters, DataSourceConfiguration, SynchronizationGroup};
pub use provider::{PollResponse, PolledConfiguration, SyncProvider};
pub use remote::{CommandRunner, ExecResult, SshCommandRunner, SshOptions, SshTarget};
pub use result::{SyncResult, SyncResultType};

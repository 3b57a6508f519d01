//! Configuration file support for bdsyncd
//!
//! Loads and validates the SSH settings and synchronization groups from a
//! TOML file. Default location: /etc/kuwaiba/bdsync.toml
//!
//! ```toml
//! [ssh]
//! connect_timeout_secs = 10
//!
//! [[groups]]
//! id = "pe"
//! name = "PE routers"
//!
//! [[groups.devices]]
//! id = "asr920-1"
//! name = "ASR920-1 over SSH"
//! parameters = { deviceId = "42", deviceClass = "Router", ipAddress = "10.0.0.1", user = "admin", password = "secret" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use kuwaiba_sync_common::{
    parameters, DataSourceConfiguration, SshOptions, SynchronizationGroup,
};

use crate::error::{BdSyncError, BdSyncResult};
use crate::tables::DEFAULT_SYNC_USER;

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/kuwaiba/bdsync.toml";

/// SSH client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshConfig {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// OpenSSH client binary
    #[serde(default = "default_ssh_path")]
    pub ssh_path: String,

    /// sshpass binary
    #[serde(default = "default_sshpass_path")]
    pub sshpass_path: String,

    /// Port used by devices that do not set one
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Extra `-o` options passed to every session
    #[serde(default)]
    pub extra_options: Vec<String>,
}

/// One device of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Synchronization group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Complete bdsyncd configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// SSH configuration
    #[serde(default)]
    pub ssh: SshConfig,

    /// User recorded in the activity log
    #[serde(default = "default_user")]
    pub user: String,

    /// Synchronization groups
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_ssh_path() -> String {
    kuwaiba_sync_common::remote::SSH_CMD.to_string()
}

fn default_sshpass_path() -> String {
    kuwaiba_sync_common::remote::SSHPASS_CMD.to_string()
}

fn default_port() -> u16 {
    22
}

fn default_user() -> String {
    DEFAULT_SYNC_USER.to_string()
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            ssh_path: default_ssh_path(),
            sshpass_path: default_sshpass_path(),
            default_port: default_port(),
            extra_options: Vec::new(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ssh: SshConfig::default(),
            user: default_user(),
            groups: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> BdSyncResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                BdSyncError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(BdSyncError::Io(e)),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> BdSyncResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            BdSyncError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.ssh.connect_timeout_secs)
    }

    /// SSH client options for [`SshCommandRunner`](kuwaiba_sync_common::SshCommandRunner)
    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            ssh_path: self.ssh.ssh_path.clone(),
            sshpass_path: self.ssh.sshpass_path.clone(),
            connect_timeout: self.connect_timeout(),
            extra_options: self.ssh.extra_options.clone(),
        }
    }

    /// Validate configuration
    ///
    /// Device parameters are not checked here; a device with missing
    /// parameters fails on its own at poll time without affecting the rest.
    pub fn validate(&self) -> BdSyncResult<()> {
        if self.ssh.connect_timeout_secs == 0 {
            return Err(BdSyncError::Configuration(
                "connect_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.ssh.default_port == 0 {
            return Err(BdSyncError::Configuration(
                "default_port must be > 0".to_string(),
            ));
        }

        let mut group_ids = HashSet::new();
        for group in &self.groups {
            if group.id.trim().is_empty() {
                return Err(BdSyncError::Configuration(
                    "group id must not be empty".to_string(),
                ));
            }
            if !group_ids.insert(group.id.as_str()) {
                return Err(BdSyncError::Configuration(format!(
                    "duplicate group '{}'",
                    group.id
                )));
            }

            let mut device_ids = HashSet::new();
            for device in &group.devices {
                if device.id.trim().is_empty() {
                    return Err(BdSyncError::Configuration(format!(
                        "device id must not be empty in group '{}'",
                        group.id
                    )));
                }
                if !device_ids.insert(device.id.as_str()) {
                    return Err(BdSyncError::Configuration(format!(
                        "duplicate device '{}' in group '{}'",
                        device.id, group.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Synchronization groups with the SSH default port filled in
    pub fn synchronization_groups(&self) -> Vec<SynchronizationGroup> {
        self.groups
            .iter()
            .map(|group| {
                let name = if group.name.is_empty() { &group.id } else { &group.name };
                group.devices.iter().fold(
                    SynchronizationGroup::new(&group.id, name),
                    |acc, device| acc.with_configuration(self.data_source(device)),
                )
            })
            .collect()
    }

    fn data_source(&self, device: &DeviceConfig) -> DataSourceConfiguration {
        let name = if device.name.is_empty() { &device.id } else { &device.name };
        let mut configuration = DataSourceConfiguration::new(&device.id, name);
        configuration.parameters = device.parameters.clone();
        configuration
            .parameters
            .entry(parameters::PORT.to_string())
            .or_insert_with(|| self.ssh.default_port.to_string());
        configuration
    }
}

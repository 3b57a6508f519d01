//! Data source configurations and synchronization groups.
//!
//! A data source configuration is the key-value parameter bag that tells a
//! sync provider which device to poll and how to reach it. It is immutable
//! for the duration of a sync run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, SyncError};

/// Parameter names understood by the device sync providers.
pub mod parameters {
    /// Id of the device in the inventory.
    pub const DEVICE_ID: &str = "deviceId";

    /// Class of the device in the inventory.
    pub const DEVICE_CLASS: &str = "deviceClass";

    /// Management address.
    pub const IP_ADDRESS: &str = "ipAddress";

    /// SSH port.
    pub const PORT: &str = "port";

    /// SSH user.
    pub const USER: &str = "user";

    /// SSH password.
    pub const PASSWORD: &str = "password";

    /// Parameters every SSH-polled configuration must define.
    pub const REQUIRED: [&str; 6] = [DEVICE_ID, DEVICE_CLASS, IP_ADDRESS, PORT, USER, PASSWORD];
}

/// Builds a parameter map from key-value pairs.
#[macro_export]
macro_rules! sync_parameters {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut params = ::std::collections::BTreeMap::<String, String>::new();
        $(params.insert($key.to_string(), $value.to_string());)*
        params
    }};
}

/// Parameter bag identifying one device.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl DataSourceConfiguration {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds or replaces a parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Gets a parameter value, if present.
    pub fn get_parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Gets a parameter that must be present and non-blank.
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.get_parameter(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(SyncError::missing_parameter(&self.name, key)),
        }
    }

    /// Checks every key of `keys`, reporting the first one missing.
    pub fn require_all(&self, keys: &[&str]) -> Result<()> {
        keys.iter().try_for_each(|key| self.require(key).map(|_| ()))
    }

    /// Gets a parameter that must parse as a TCP port.
    pub fn require_port(&self, key: &str) -> Result<u16> {
        let raw = self.require(key)?;
        match raw.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(SyncError::invalid_parameter(key, raw, "not a valid TCP port")),
        }
    }
}

impl fmt::Debug for DataSourceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted: BTreeMap<&str, &str> = self
            .parameters
            .iter()
            .map(|(k, v)| {
                if k == parameters::PASSWORD {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("DataSourceConfiguration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parameters", &redacted)
            .finish()
    }
}

/// Named list of configurations synchronized together, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizationGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub configurations: Vec<DataSourceConfiguration>,
}

impl SynchronizationGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            configurations: Vec::new(),
        }
    }

    /// Appends a configuration.
    pub fn with_configuration(mut self, configuration: DataSourceConfiguration) -> Self {
        self.configurations.push(configuration);
        self
    }
}

//! Error types for sync operations.
//!
//! Every member of the taxonomy is reported per configuration (poll errors)
//! or per decision (ERROR results). None of them aborts a batch.

use std::io;
use thiserror::Error;

use kuwaiba_inventory::InventoryError;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while polling or reconciling a device.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required configuration parameter is absent or blank.
    #[error("Parameter '{parameter}' not defined in data source configuration '{configuration}'")]
    MissingParameter {
        /// The configuration being processed.
        configuration: String,
        /// The missing parameter.
        parameter: String,
    },

    /// A parameter is present but unusable.
    #[error("Invalid value '{value}' for parameter '{parameter}': {message}")]
    InvalidParameter {
        /// The offending parameter.
        parameter: String,
        /// Its value.
        value: String,
        /// Why it was rejected.
        message: String,
    },

    /// No parser is registered for the device model.
    #[error("Model '{model}' of device '{device}' is not supported by this sync provider")]
    UnsupportedModel {
        /// Display name of the device.
        device: String,
        /// Model tag derived from the display name.
        model: String,
    },

    /// Failed to spawn the SSH client.
    #[error("Failed to execute remote command '{command}': {source}")]
    RemoteExec {
        /// The remote command.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The SSH session could not be established (connection or authentication).
    #[error("Could not connect to {host}:{port}: {output}")]
    ConnectionFailed {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// SSH client output.
        output: String,
    },

    /// The remote command returned a non-zero exit status.
    #[error("Remote command '{command}' failed on {host} (exit code {exit_code}): {output}")]
    CommandFailed {
        /// Target host.
        host: String,
        /// The remote command.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Command output does not follow the expected format.
    #[error("Could not parse output of '{command}': {message}")]
    Parse {
        /// Command whose output was rejected.
        command: String,
        /// Error message.
        message: String,
    },

    /// Inventory operation failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl SyncError {
    /// Creates a missing parameter error.
    pub fn missing_parameter(
        configuration: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        Self::MissingParameter {
            configuration: configuration.into(),
            parameter: parameter.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported model error.
    pub fn unsupported_model(device: impl Into<String>, model: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            device: device.into(),
            model: model.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for the invalid-argument members of the taxonomy, the
    /// ones detected before any connection is attempted.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SyncError::MissingParameter { .. }
                | SyncError::InvalidParameter { .. }
                | SyncError::UnsupportedModel { .. }
        )
    }
}

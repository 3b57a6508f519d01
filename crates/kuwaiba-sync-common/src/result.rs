//! Sync result log records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a sync decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncResultType {
    Error,
    Success,
    Warning,
    Information,
}

impl SyncResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncResultType::Error => "ERROR",
            SyncResultType::Success => "SUCCESS",
            SyncResultType::Warning => "WARNING",
            SyncResultType::Information => "INFORMATION",
        }
    }
}

impl fmt::Display for SyncResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciliation decision.
///
/// Records are created once and never mutated; fields are only exposed
/// through getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    data_source_id: String,
    result_type: SyncResultType,
    action_description: String,
    result: String,
}

impl SyncResult {
    pub fn new(
        data_source_id: impl Into<String>,
        result_type: SyncResultType,
        action_description: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            data_source_id: data_source_id.into(),
            result_type,
            action_description: action_description.into(),
            result: result.into(),
        }
    }

    pub fn error(
        data_source_id: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self::new(data_source_id, SyncResultType::Error, action, result)
    }

    pub fn success(
        data_source_id: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self::new(data_source_id, SyncResultType::Success, action, result)
    }

    pub fn warning(
        data_source_id: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self::new(data_source_id, SyncResultType::Warning, action, result)
    }

    pub fn information(
        data_source_id: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self::new(data_source_id, SyncResultType::Information, action, result)
    }

    pub fn data_source_id(&self) -> &str {
        &self.data_source_id
    }

    pub fn result_type(&self) -> SyncResultType {
        self.result_type
    }

    pub fn action_description(&self) -> &str {
        &self.action_description
    }

    pub fn result(&self) -> &str {
        &self.result
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.result_type, self.action_description, self.result
        )
    }
}

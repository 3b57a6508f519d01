//! Sync provider abstraction.
//!
//! A provider turns a [`SynchronizationGroup`] into a [`PollResponse`]
//! (`mapped_poll`) and reconciles that response against the inventory
//! (`sync`). Per-configuration failures travel inside the response; neither
//! step fails as a whole.

use async_trait::async_trait;

use crate::error::SyncError;
use crate::params::{DataSourceConfiguration, SynchronizationGroup};
use crate::result::SyncResult;

/// Entities extracted from one configuration.
#[derive(Debug)]
pub struct PolledConfiguration<E> {
    pub configuration: DataSourceConfiguration,
    pub entities: Vec<E>,
}

/// Outcome of polling a synchronization group.
#[derive(Debug)]
pub struct PollResponse<E> {
    polled: Vec<PolledConfiguration<E>>,
    errors: Vec<(String, SyncError)>,
}

impl<E> PollResponse<E> {
    pub fn new() -> Self {
        Self {
            polled: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Records the entities parsed for a configuration.
    pub fn add_entities(&mut self, configuration: DataSourceConfiguration, entities: Vec<E>) {
        self.polled.push(PolledConfiguration {
            configuration,
            entities,
        });
    }

    /// Records an error against a configuration id.
    pub fn add_error(&mut self, configuration_id: impl Into<String>, error: SyncError) {
        self.errors.push((configuration_id.into(), error));
    }

    /// Successfully polled configurations, in poll order.
    pub fn polled(&self) -> &[PolledConfiguration<E>] {
        &self.polled
    }

    /// Entities of one configuration, if it was polled successfully.
    pub fn entities_for(&self, configuration_id: &str) -> Option<&[E]> {
        self.polled
            .iter()
            .find(|p| p.configuration.id == configuration_id)
            .map(|p| p.entities.as_slice())
    }

    /// All recorded errors as (configuration id, error).
    pub fn errors(&self) -> &[(String, SyncError)] {
        &self.errors
    }

    /// Errors recorded for one configuration.
    pub fn errors_for<'a>(
        &'a self,
        configuration_id: &'a str,
    ) -> impl Iterator<Item = &'a SyncError> + 'a {
        self.errors
            .iter()
            .filter(move |(id, _)| id == configuration_id)
            .map(|(_, e)| e)
    }
}

impl<E> Default for PollResponse<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Synchronization provider driven by the sync framework.
#[async_trait]
pub trait SyncProvider: Send + Sync {
    /// Entity type produced by polling.
    type Entity: Send + Sync;

    /// Stable identifier of the provider.
    fn id(&self) -> &str;

    /// Human readable name.
    fn display_name(&self) -> &str;

    /// True if results can be applied without user review.
    fn is_automated(&self) -> bool {
        true
    }

    /// Polls every configuration of the group, sequentially.
    async fn mapped_poll(&self, group: &SynchronizationGroup) -> PollResponse<Self::Entity>;

    /// Reconciles polled entities against the inventory.
    async fn sync(&self, response: &PollResponse<Self::Entity>) -> Vec<SyncResult>;

    /// Polls then syncs, reporting every poll error as an ERROR result ahead
    /// of the reconciliation results.
    async fn automated_sync(&self, group: &SynchronizationGroup) -> Vec<SyncResult> {
        let response = self.mapped_poll(group).await;
        let mut results: Vec<SyncResult> = response
            .errors()
            .iter()
            .map(|(id, error)| {
                SyncResult::error(id.as_str(), "Poll data source", error.to_string())
            })
            .collect();
        results.extend(self.sync(&response).await);
        results
    }
}

//! Observation store trait (write-only external interface, §6)

use async_trait::async_trait;

use crate::domain::entities::observation::Observation;
use crate::shared::AdherenceResult;

/// Append-only persistence capability for observations.
///
/// The store must support linkage by reference from a child (medication-level)
/// observation to its parent (measure-level) observation via
/// `Observation::parent_observation_id`. Implementations never overwrite a
/// prior observation; the writer (C7) only ever calls `create`.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Persists a new observation and returns it, with any store-assigned
    /// fields (e.g. a generated id) filled in.
    async fn create_observation(&self, observation: Observation) -> AdherenceResult<Observation>;
}

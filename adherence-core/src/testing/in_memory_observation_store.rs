use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::measure::Measure;
use crate::domain::entities::observation::Observation;
use crate::domain::repositories::ObservationStore;
use crate::shared::AdherenceResult;

/// Append-only in-memory observation log. Mirrors the "latest
/// `effective_date_time` wins" rule from §3/§7 via [`Self::current_for`].
#[derive(Default)]
pub struct InMemoryObservationStore {
    observations: RwLock<Vec<Observation>>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Observation> {
        self.observations.read().unwrap().clone()
    }

    /// The authoritative observation for a `(patient, measure[, drug])`
    /// triple: the one with the greatest `effective_date_time`.
    pub fn current_for(&self, patient_id: Uuid, measure: Measure, rxnorm_code: Option<&str>) -> Option<Observation> {
        self.observations
            .read()
            .unwrap()
            .iter()
            .filter(|o| o.patient_id == patient_id && o.measure == measure && o.medication_rxnorm.as_deref() == rxnorm_code)
            .max_by_key(|o| o.effective_date_time)
            .cloned()
    }
}

#[async_trait]
impl ObservationStore for InMemoryObservationStore {
    async fn create_observation(&self, observation: Observation) -> AdherenceResult<Observation> {
        self.observations.write().unwrap().push(observation.clone());
        Ok(observation)
    }
}

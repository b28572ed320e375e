use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Datelike;
use uuid::Uuid;

use crate::domain::entities::dispense::Dispense;
use crate::domain::repositories::DispenseStore;
use crate::shared::AdherenceResult;

/// A fixed set of dispenses, keyed by patient, served back in full; the
/// store itself filters to the requested measurement year so callers can
/// seed multi-year fixtures and exercise year-scoping.
#[derive(Default)]
pub struct InMemoryDispenseStore {
    by_patient: RwLock<HashMap<Uuid, Vec<Dispense>>>,
}

impl InMemoryDispenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, patient_id: Uuid, dispenses: Vec<Dispense>) {
        self.by_patient.write().unwrap().insert(patient_id, dispenses);
    }
}

#[async_trait]
impl DispenseStore for InMemoryDispenseStore {
    async fn dispenses_for_patient(&self, patient_id: Uuid, measurement_year: i32) -> AdherenceResult<Vec<Dispense>> {
        let guard = self.by_patient.read().unwrap();
        let dispenses = guard
            .get(&patient_id)
            .map(|d| {
                d.iter()
                    .filter(|dispense| {
                        let fill_date = dispense.when_handed_over.or(dispense.when_prepared);
                        fill_date.is_some_and(|d| d.year() == measurement_year)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(dispenses)
    }
}

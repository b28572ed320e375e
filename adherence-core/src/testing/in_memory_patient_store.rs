use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::patient_summary::PatientSummary;
use crate::domain::repositories::PatientStore;
use crate::shared::AdherenceResult;

/// A wholesale-replaced summary record per patient, matching the "rewritten
/// on each run, no history" lifecycle from §3.
#[derive(Default)]
pub struct InMemoryPatientStore {
    summaries: RwLock<HashMap<Uuid, PatientSummary>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn get_patient_summary(&self, patient_id: Uuid) -> AdherenceResult<Option<PatientSummary>> {
        Ok(self.summaries.read().unwrap().get(&patient_id).cloned())
    }

    async fn update_patient_summary(&self, patient_id: Uuid, summary: PatientSummary) -> AdherenceResult<()> {
        self.summaries.write().unwrap().insert(patient_id, summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn update_then_read_round_trips() {
        let store = InMemoryPatientStore::new();
        let patient_id = Uuid::new_v4();
        assert!(store.get_patient_summary(patient_id).await.unwrap().is_none());

        let summary = PatientSummary {
            worst_tier: None,
            min_days_until_runout: Some(5),
            enrolled_measures: Vec::new(),
            calculated_at: Utc::now(),
        };
        store.update_patient_summary(patient_id, summary).await.unwrap();

        let read_back = store.get_patient_summary(patient_id).await.unwrap().unwrap();
        assert_eq!(read_back.min_days_until_runout, Some(5));
    }

    #[tokio::test]
    async fn rewrites_wholesale_on_second_update() {
        let store = InMemoryPatientStore::new();
        let patient_id = Uuid::new_v4();

        store
            .update_patient_summary(
                patient_id,
                PatientSummary {
                    worst_tier: None,
                    min_days_until_runout: Some(10),
                    enrolled_measures: Vec::new(),
                    calculated_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        store
            .update_patient_summary(
                patient_id,
                PatientSummary {
                    worst_tier: None,
                    min_days_until_runout: Some(2),
                    enrolled_measures: Vec::new(),
                    calculated_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let read_back = store.get_patient_summary(patient_id).await.unwrap().unwrap();
        assert_eq!(read_back.min_days_until_runout, Some(2));
    }
}

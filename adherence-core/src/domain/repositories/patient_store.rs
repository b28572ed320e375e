//! Patient store trait (optional read/write external interface, §6)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::patient_summary::PatientSummary;
use crate::shared::AdherenceResult;

/// Optional capability for attaching a small patient-level summary record.
///
/// Callers that don't need a patient-level rollup (e.g. a one-off batch
/// report) may choose not to invoke this at all; the orchestrator treats a
/// failure here as non-fatal to the observations already written (§7).
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Reads the current summary for a patient, if one has been written.
    async fn get_patient_summary(&self, patient_id: Uuid) -> AdherenceResult<Option<PatientSummary>>;

    /// Replaces the patient's summary wholesale.
    async fn update_patient_summary(
        &self,
        patient_id: Uuid,
        summary: PatientSummary,
    ) -> AdherenceResult<()>;
}

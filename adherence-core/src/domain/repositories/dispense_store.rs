//! Dispense store trait (read-only external interface, §6)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::dispense::Dispense;
use crate::shared::AdherenceResult;

/// Read-only query capability over completed medication dispenses.
///
/// The core never writes through this trait; dispense ingestion is out of
/// scope (§1).
#[async_trait]
pub trait DispenseStore: Send + Sync {
    /// Completed dispenses for a patient whose fill date falls within the
    /// given calendar year.
    async fn dispenses_for_patient(
        &self,
        patient_id: Uuid,
        measurement_year: i32,
    ) -> AdherenceResult<Vec<Dispense>>;
}

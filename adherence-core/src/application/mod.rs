pub mod cancellation;
pub mod dto;
pub mod observation_writer;
pub mod orchestrator;

pub use cancellation::{CancellationFlag, CancellationSignal, NeverCancel};
pub use dto::{BatchResult, DrugOutcome, MeasureOutcome, PatientCalculationResult, PatientItemError};
pub use observation_writer::ObservationWriter;
pub use orchestrator::{BatchProgress, OrchestratorConfig, PatientOrchestrator};

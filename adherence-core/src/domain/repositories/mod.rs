pub mod dispense_store;
pub mod observation_store;
pub mod patient_store;

pub use dispense_store::DispenseStore;
pub use observation_store::ObservationStore;
pub use patient_store::PatientStore;

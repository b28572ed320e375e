//! In-memory reference implementations of the external-interface traits
//! (§6), for the demo CLI and integration tests. Not a persistence layer —
//! the real dispense/observation backends are out of scope (§1) — but the
//! standard pattern for exercising the orchestrator without a database.

pub mod in_memory_dispense_store;
pub mod in_memory_observation_store;
pub mod in_memory_patient_store;

pub use in_memory_dispense_store::InMemoryDispenseStore;
pub use in_memory_observation_store::InMemoryObservationStore;
pub use in_memory_patient_store::InMemoryPatientStore;

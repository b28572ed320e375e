pub mod coding;
pub mod dispense;
pub mod fragility;
pub mod measure;
pub mod observation;
pub mod patient_summary;
pub mod pdc_result;

use thiserror::Error;

/// Errors that can arise from the I/O-bearing edges of the adherence pipeline.
///
/// Pure calculation components (the measure classifier, fill extractor, interval
/// merger, PDC calculator, refill forecaster, and fragility engine) never produce
/// this type — per the HEDIS calculation contract they always return a well-formed
/// value. Only the external-interface traits and the orchestrator that drives them
/// are fallible.
#[derive(Error, Debug)]
pub enum AdherenceError {
    #[error("dispense store read failed: {0}")]
    StoreRead(String),

    #[error("observation store write failed: {0}")]
    StoreWrite(String),

    #[error("patient summary update failed: {0}")]
    SummaryUpdate(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation cancelled")]
    Cancelled,

    /// The patient has no MA-qualifying fills in the measurement year.
    /// Not a fault: the orchestrator still returns a structured result
    /// with an empty `measures` list (§7).
    #[error("no medication-adherence-qualifying dispenses in measurement year")]
    NoMaDispenses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StoreRead,
    StoreWrite,
    SummaryUpdate,
    Configuration,
    Cancelled,
    NoMaDispenses,
}

impl From<&AdherenceError> for ErrorKind {
    fn from(err: &AdherenceError) -> Self {
        match err {
            AdherenceError::StoreRead(_) => ErrorKind::StoreRead,
            AdherenceError::StoreWrite(_) => ErrorKind::StoreWrite,
            AdherenceError::SummaryUpdate(_) => ErrorKind::SummaryUpdate,
            AdherenceError::Configuration(_) => ErrorKind::Configuration,
            AdherenceError::Cancelled => ErrorKind::Cancelled,
            AdherenceError::NoMaDispenses => ErrorKind::NoMaDispenses,
        }
    }
}

/// Result alias used throughout the I/O-bearing layers of the crate.
pub type AdherenceResult<T> = Result<T, AdherenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_maps_one_to_one_with_variant() {
        assert_eq!(ErrorKind::from(&AdherenceError::StoreRead("x".into())), ErrorKind::StoreRead);
        assert_eq!(ErrorKind::from(&AdherenceError::NoMaDispenses), ErrorKind::NoMaDispenses);
        assert_eq!(ErrorKind::from(&AdherenceError::Cancelled), ErrorKind::Cancelled);
    }
}

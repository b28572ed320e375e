pub mod error;

pub use error::{AdherenceError, AdherenceResult, ErrorKind};

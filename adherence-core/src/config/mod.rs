pub mod settings;

pub use settings::{FragilityConfig, LoggingConfig, MeasureCodeSets, PdcConfig, Settings};

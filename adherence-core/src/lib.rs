//! HEDIS medication-adherence core: Proportion of Days Covered (PDC)
//! calculation, fragility-tier classification, and the orchestrator that
//! drives both per patient and writes the results as observations.
//!
//! See `SPEC_FULL.md` at the workspace root for the full component
//! contract. The pure calculation components (measure classifier, fill
//! extractor, interval merger, PDC calculator, refill forecaster, fragility
//! engine) live under [`domain::services`] and never fail; the I/O-bearing
//! observation writer and orchestrator live under [`application`].

pub mod application;
pub mod config;
pub mod domain;
pub mod shared;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

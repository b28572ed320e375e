//! Demo CLI for the adherence pipeline.
//!
//! Loads a small JSON fixture of dispenses, runs the patient orchestrator
//! against the in-memory reference stores, and prints each patient's PDC
//! and fragility outcome. Not a specified wire protocol: a script for
//! exercising the library through its published contracts.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;
use uuid::Uuid;

use adherence_core::application::{NeverCancel, PatientOrchestrator};
use adherence_core::config::{FragilityConfig, LoggingConfig, MeasureCodeSets, PdcConfig, Settings};
use adherence_core::domain::clock::{Clock, FixedClock, SystemClock};
use adherence_core::domain::entities::coding::{CodeableConcept, Coding};
use adherence_core::domain::entities::dispense::Dispense;
use adherence_core::testing::{InMemoryDispenseStore, InMemoryObservationStore, InMemoryPatientStore};

#[derive(Parser)]
#[command(name = "adherence-cli")]
#[command(about = "Runs the PDC/fragility pipeline over a JSON dispense fixture", long_about = None)]
struct Cli {
    /// Path to a dispense fixture (see demos/fixtures/sample_dispenses.json).
    #[arg(short, long, default_value = "demos/fixtures/sample_dispenses.json")]
    fixture: PathBuf,

    /// Overrides the measurement year encoded in the fixture.
    #[arg(long)]
    measurement_year: Option<i32>,

    /// Pins "today" to a fixed date (YYYY-MM-DD) instead of the system clock,
    /// for reproducible demo output.
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    measurement_year: i32,
    patients: Vec<FixturePatient>,
}

#[derive(Debug, Deserialize)]
struct FixturePatient {
    patient_id: Uuid,
    label: String,
    dispenses: Vec<FixtureDispense>,
}

#[derive(Debug, Deserialize)]
struct FixtureDispense {
    when_handed_over: Option<NaiveDate>,
    when_prepared: Option<NaiveDate>,
    days_supply: Option<i64>,
    rxnorm_code: Option<String>,
}

impl FixtureDispense {
    fn into_dispense(self, patient_id: Uuid) -> Dispense {
        let codings = self.rxnorm_code.into_iter().map(Coding::rxnorm).collect();
        Dispense {
            id: Uuid::new_v4(),
            patient_id,
            when_handed_over: self.when_handed_over,
            when_prepared: self.when_prepared,
            days_supply: self.days_supply,
            medication_codeable_concept: CodeableConcept::new(codings),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();
    let raw = std::fs::read_to_string(&cli.fixture)
        .with_context(|| format!("reading fixture at {}", cli.fixture.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw).context("parsing fixture JSON")?;
    let measurement_year = cli.measurement_year.unwrap_or(fixture.measurement_year);

    let settings = Settings {
        measure_codes: MeasureCodeSets::default_for_year(measurement_year),
        pdc: PdcConfig::default(),
        fragility: FragilityConfig::default(),
        logging: LoggingConfig { level: "info".to_string() },
    };

    let dispense_store = InMemoryDispenseStore::new();
    let observation_store = InMemoryObservationStore::new();
    let patient_store = InMemoryPatientStore::new();

    let mut labels = HashMap::new();
    for patient in &fixture.patients {
        labels.insert(patient.patient_id, patient.label.clone());
    }

    for patient in fixture.patients {
        let dispenses = patient
            .dispenses
            .into_iter()
            .map(|d| d.into_dispense(patient.patient_id))
            .collect();
        dispense_store.seed(patient.patient_id, dispenses);
    }

    let clock: Box<dyn Clock> = match cli.as_of {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };

    let orchestrator = PatientOrchestrator::new(
        &dispense_store,
        &observation_store,
        Some(&patient_store),
        clock.as_ref(),
        &settings,
        Default::default(),
    );

    for (patient_id, label) in labels {
        let result = orchestrator.process_patient(patient_id, measurement_year, &NeverCancel).await;
        println!("\n{label} ({patient_id})");
        if result.measures.is_empty() {
            println!("  no MA-qualifying fills in {measurement_year}");
        }
        for measure in &result.measures {
            println!(
                "  {:<8} pdc={:>6.1}%  statusQuo={:>6.1}%  perfect={:>6.1}%  tier={:<18} priority={}",
                measure.measure.code(),
                measure.pdc.pdc,
                measure.pdc.pdc_status_quo,
                measure.pdc.pdc_perfect,
                measure.fragility.tier.code(),
                measure.fragility.priority_score,
            );
        }
        if let Some(tier) = result.summary.worst_tier {
            println!("  worst tier: {}", tier.code());
        }
        for error in &result.errors {
            println!("  error: {}", error.error);
        }
    }

    Ok(())
}

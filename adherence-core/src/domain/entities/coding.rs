use serde::{Deserialize, Serialize};

/// A single code from a named code system, FHIR-`Coding`-flavored.
///
/// This is deliberately a small value type, not a full FHIR resource: the
/// pipeline only ever needs to carry a code, its system, and an optional
/// display string across the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: Option<String>,
}

impl Coding {
    pub fn rxnorm(code: impl Into<String>) -> Self {
        Self {
            system: "http://www.nlm.nih.gov/research/umls/rxnorm".to_string(),
            code: code.into(),
            display: None,
        }
    }
}

/// A set of `Coding`s describing the same concept, FHIR-`CodeableConcept`-flavored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    pub codings: Vec<Coding>,
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn new(codings: Vec<Coding>) -> Self {
        Self {
            codings,
            text: None,
        }
    }

    /// The first RxNorm coding present, if any.
    pub fn rxnorm_code(&self) -> Option<&str> {
        self.codings
            .iter()
            .find(|c| c.system.contains("rxnorm"))
            .map(|c| c.code.as_str())
    }
}

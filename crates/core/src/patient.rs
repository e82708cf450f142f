//! Patient record collected from the intake form or API request.
//!
//! Records are constructed per request and never stored.

use serde::{Deserialize, Serialize};

use crate::clearance::PatientVitals;
use crate::{ScribeError, ScribeResult};

/// Clinical details used to build prompts and run the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub age: u32,
    pub weight_kg: f64,
    /// Serum creatinine in mg/dL.
    pub creatinine: f64,
    pub admitting_diagnosis: String,
    #[serde(default)]
    pub diagnosis_codes: Vec<String>,
    #[serde(default)]
    pub prior_notes: Option<String>,
}

impl PatientRecord {
    /// Checks the free-text fields a prompt cannot do without.
    ///
    /// Numeric plausibility is left to the calculator so that its validation mode applies.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::InvalidInput` if the name or admitting diagnosis is blank.
    pub fn validate(&self) -> ScribeResult<()> {
        if self.name.trim().is_empty() {
            return Err(ScribeError::InvalidInput("name cannot be empty".into()));
        }
        if self.admitting_diagnosis.trim().is_empty() {
            return Err(ScribeError::InvalidInput(
                "admitting_diagnosis cannot be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn vitals(&self) -> PatientVitals {
        PatientVitals {
            age: self.age,
            weight_kg: self.weight_kg,
            creatinine: self.creatinine,
        }
    }

    /// Prior notes, if any non-blank text was supplied.
    pub fn prior_notes(&self) -> Option<&str> {
        self.prior_notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }
}

/// One-line admission summary produced without the generation service.
pub fn admission_summary(record: &PatientRecord) -> String {
    format!(
        "{} (age {}) is admitted for {}.",
        record.name.trim(),
        record.age,
        record.admitting_diagnosis.trim()
    )
}

/// Opening line of a consult request produced without the generation service.
pub fn consult_request(record: &PatientRecord) -> String {
    format!(
        "Hello, may I please consult you on {} who is being admitted for {} for assistance with...",
        record.name.trim(),
        record.admitting_diagnosis.trim()
    )
}

#[cfg(test)]
pub(crate) fn sample_record() -> PatientRecord {
    PatientRecord {
        name: "Jane Doe".into(),
        age: 60,
        weight_kg: 80.0,
        creatinine: 1.0,
        admitting_diagnosis: "community-acquired pneumonia".into(),
        diagnosis_codes: vec!["J18.9".into()],
        prior_notes: Some("  Seen in clinic last week.  ".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_matches_template() {
        assert_eq!(
            admission_summary(&sample_record()),
            "Jane Doe (age 60) is admitted for community-acquired pneumonia."
        );
    }

    #[test]
    fn consult_request_matches_template() {
        assert_eq!(
            consult_request(&sample_record()),
            "Hello, may I please consult you on Jane Doe who is being admitted for \
             community-acquired pneumonia for assistance with..."
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let record = PatientRecord {
            name: "  ".into(),
            ..sample_record()
        };
        let err = record.validate().expect_err("blank name");
        assert!(matches!(err, ScribeError::InvalidInput(msg) if msg.contains("name")));
    }

    #[test]
    fn blank_diagnosis_is_rejected() {
        let record = PatientRecord {
            admitting_diagnosis: String::new(),
            ..sample_record()
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn prior_notes_are_trimmed_and_blank_treated_as_missing() {
        assert_eq!(
            sample_record().prior_notes(),
            Some("Seen in clinic last week.")
        );
        let record = PatientRecord {
            prior_notes: Some("   ".into()),
            ..sample_record()
        };
        assert_eq!(record.prior_notes(), None);
    }

    #[test]
    fn deserialises_without_optional_fields() {
        let record: PatientRecord = serde_json::from_str(
            r#"{"name":"A","age":50,"weight_kg":70.5,"creatinine":1.2,"admitting_diagnosis":"CHF"}"#,
        )
        .expect("parse record");
        assert!(record.diagnosis_codes.is_empty());
        assert!(record.prior_notes.is_none());
    }
}

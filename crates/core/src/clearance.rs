//! Renal clearance estimate and the anticoagulant recommendation derived from it.
//!
//! The estimate is Cockcroft-Gault without the sex correction factor:
//!
//! ```text
//! clearance = ((140 - age) * weight_kg) / (72 * creatinine)
//! ```
//!
//! No sex/gender field is collected, so callers must not treat the value as clinically complete.
//! A clearance strictly below 30 mL/min recommends heparin; anything else (including exactly 30)
//! recommends Lovenox. The comparison uses the unrounded value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLEARANCE_AGE_OFFSET, CLEARANCE_CREATININE_FACTOR, HEPARIN_CLEARANCE_THRESHOLD, USE_HEPARIN,
    USE_LOVENOX,
};
use crate::{ScribeError, ScribeResult};

/// Calculator input, constructed per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientVitals {
    /// Age in whole years.
    pub age: u32,
    /// Body weight in kilograms.
    pub weight_kg: f64,
    /// Serum creatinine in mg/dL.
    pub creatinine: f64,
}

/// Anticoagulant recommendation. Serialises to the display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Use Heparin")]
    Heparin,
    #[serde(rename = "Use Lovenox")]
    Lovenox,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Heparin => USE_HEPARIN,
            Recommendation::Lovenox => USE_LOVENOX,
        }
    }

    /// Drug name without the "Use" prefix.
    pub fn drug(&self) -> &'static str {
        match self {
            Recommendation::Heparin => "Heparin",
            Recommendation::Lovenox => "Lovenox",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of [`compute_clearance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClearanceResult {
    creatinine_clearance: f64,
    recommendation: Recommendation,
    #[serde(skip)]
    unrounded: f64,
}

impl ClearanceResult {
    /// Clearance rounded to one decimal place.
    pub fn creatinine_clearance(&self) -> f64 {
        self.creatinine_clearance
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    /// Clearance before rounding; the recommendation was chosen from this value.
    pub fn unrounded(&self) -> f64 {
        self.unrounded
    }
}

/// How strictly calculator inputs are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearanceMode {
    /// Only non-positive or non-finite creatinine is rejected. Ages above 140 yield a negative
    /// clearance that passes through unflagged.
    #[default]
    Permissive,
    /// Also rejects age 0, age of 140 or more and non-positive weight.
    Strict,
}

impl FromStr for ClearanceMode {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(ClearanceMode::Permissive),
            "strict" => Ok(ClearanceMode::Strict),
            other => Err(ScribeError::InvalidInput(format!(
                "unknown clearance mode '{other}' (expected 'permissive' or 'strict')"
            ))),
        }
    }
}

/// Which Heparin/Lovenox rule a draft uses.
///
/// The two rules disagree (continuous formula versus a fixed creatinine cutoff) and are kept as
/// separate strategies. Only `CockcroftGault` is ever computed; `CreatinineCutoff` is handed to the
/// model as instruction text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProphylaxisRule {
    #[default]
    CockcroftGault,
    CreatinineCutoff,
}

impl ProphylaxisRule {
    /// True when the core computes the recommendation itself.
    pub fn is_computed(&self) -> bool {
        matches!(self, ProphylaxisRule::CockcroftGault)
    }
}

impl FromStr for ProphylaxisRule {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cockcroft-gault" | "clearance" => Ok(ProphylaxisRule::CockcroftGault),
            "creatinine-cutoff" | "cutoff" => Ok(ProphylaxisRule::CreatinineCutoff),
            other => Err(ScribeError::InvalidInput(format!(
                "unknown prophylaxis rule '{other}' (expected 'cockcroft-gault' or 'creatinine-cutoff')"
            ))),
        }
    }
}

/// Computes the clearance estimate in permissive mode.
///
/// # Errors
///
/// Returns `ScribeError::InvalidInput` if `creatinine` is not strictly positive or any input is
/// not a finite number.
pub fn compute_clearance(age: u32, weight_kg: f64, creatinine: f64) -> ScribeResult<ClearanceResult> {
    compute_clearance_with_mode(
        &PatientVitals {
            age,
            weight_kg,
            creatinine,
        },
        ClearanceMode::Permissive,
    )
}

/// Computes the clearance estimate, validating inputs according to `mode`.
///
/// # Errors
///
/// Returns `ScribeError::InvalidInput` when validation for the selected mode fails.
pub fn compute_clearance_with_mode(
    vitals: &PatientVitals,
    mode: ClearanceMode,
) -> ScribeResult<ClearanceResult> {
    validate_vitals(vitals, mode)?;

    let unrounded = ((CLEARANCE_AGE_OFFSET - f64::from(vitals.age)) * vitals.weight_kg)
        / (CLEARANCE_CREATININE_FACTOR * vitals.creatinine);

    let recommendation = if unrounded < HEPARIN_CLEARANCE_THRESHOLD {
        Recommendation::Heparin
    } else {
        Recommendation::Lovenox
    };

    Ok(ClearanceResult {
        creatinine_clearance: round_one_decimal(unrounded),
        recommendation,
        unrounded,
    })
}

fn validate_vitals(vitals: &PatientVitals, mode: ClearanceMode) -> ScribeResult<()> {
    if !vitals.weight_kg.is_finite() || !vitals.creatinine.is_finite() {
        return Err(ScribeError::InvalidInput(
            "weight and creatinine must be finite numbers".into(),
        ));
    }

    if vitals.creatinine <= 0.0 {
        return Err(ScribeError::InvalidInput(
            "creatinine must be greater than 0".into(),
        ));
    }

    if mode == ClearanceMode::Strict {
        if vitals.age == 0 {
            return Err(ScribeError::InvalidInput(
                "age must be greater than 0".into(),
            ));
        }
        if f64::from(vitals.age) >= CLEARANCE_AGE_OFFSET {
            return Err(ScribeError::InvalidInput(format!(
                "age must be below {CLEARANCE_AGE_OFFSET}"
            )));
        }
        if vitals.weight_kg <= 0.0 {
            return Err(ScribeError::InvalidInput(
                "weight must be greater than 0".into(),
            ));
        }
    }

    Ok(())
}

// Exact-decimal ties round to even, so 30.25 reports as 30.2.
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_renal_function_recommends_lovenox() {
        let result = compute_clearance(60, 80.0, 1.0).expect("valid input");
        assert_eq!(result.creatinine_clearance(), 88.9);
        assert_eq!(result.recommendation(), Recommendation::Lovenox);
        assert_eq!(result.recommendation().label(), "Use Lovenox");
    }

    #[test]
    fn exact_ties_round_to_even() {
        let result = compute_clearance(19, 36.0, 2.0).expect("valid input");
        assert_eq!(result.unrounded(), 30.25);
        assert_eq!(result.creatinine_clearance(), 30.2);
        assert_eq!(result.recommendation(), Recommendation::Lovenox);
    }

    #[test]
    fn impaired_renal_function_recommends_heparin() {
        let result = compute_clearance(60, 80.0, 4.0).expect("valid input");
        assert_eq!(result.creatinine_clearance(), 22.2);
        assert_eq!(result.recommendation(), Recommendation::Heparin);
    }

    #[test]
    fn zero_creatinine_is_rejected() {
        let err = compute_clearance(60, 80.0, 0.0).expect_err("should reject zero creatinine");
        assert!(matches!(err, ScribeError::InvalidInput(msg) if msg.contains("creatinine")));
    }

    #[test]
    fn negative_creatinine_is_rejected() {
        assert!(compute_clearance(60, 80.0, -1.0).is_err());
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert!(compute_clearance(60, f64::NAN, 1.0).is_err());
        assert!(compute_clearance(60, 80.0, f64::INFINITY).is_err());
    }

    #[test]
    fn exactly_thirty_recommends_lovenox() {
        // (140 - 104) * 60 / (72 * 1.0) = 30.0
        let result = compute_clearance(104, 60.0, 1.0).expect("valid input");
        assert_eq!(result.unrounded(), 30.0);
        assert_eq!(result.recommendation(), Recommendation::Lovenox);
    }

    #[test]
    fn recommendation_uses_unrounded_value() {
        // 29.97 rounds to 30.0 but is still below the threshold.
        let creatinine = (80.0 * 80.0) / (72.0 * 29.97);
        let result = compute_clearance(60, 80.0, creatinine).expect("valid input");
        assert_eq!(result.creatinine_clearance(), 30.0);
        assert_eq!(result.recommendation(), Recommendation::Heparin);
    }

    #[test]
    fn age_over_140_passes_through_as_negative_in_permissive_mode() {
        let result = compute_clearance(150, 70.0, 1.0).expect("permissive mode allows it");
        assert!(result.creatinine_clearance() < 0.0);
        assert_eq!(result.recommendation(), Recommendation::Heparin);
    }

    #[test]
    fn strict_mode_rejects_implausible_vitals() {
        let old = PatientVitals {
            age: 140,
            weight_kg: 70.0,
            creatinine: 1.0,
        };
        let err = compute_clearance_with_mode(&old, ClearanceMode::Strict)
            .expect_err("strict mode rejects age 140");
        assert!(matches!(err, ScribeError::InvalidInput(msg) if msg.contains("age")));

        let weightless = PatientVitals {
            age: 40,
            weight_kg: 0.0,
            creatinine: 1.0,
        };
        assert!(compute_clearance_with_mode(&weightless, ClearanceMode::Strict).is_err());
        assert!(compute_clearance_with_mode(&weightless, ClearanceMode::Permissive).is_ok());
    }

    #[test]
    fn matches_formula_across_inputs() {
        for age in [18_u32, 45, 60, 89, 139, 140, 160] {
            for weight in [45.5_f64, 70.0, 120.25] {
                for creatinine in [0.4_f64, 1.0, 2.3, 6.0] {
                    let expected = ((140.0 - f64::from(age)) * weight) / (72.0 * creatinine);
                    let result = compute_clearance(age, weight, creatinine).expect("valid input");
                    assert_eq!(result.unrounded(), expected);
                    assert!((result.creatinine_clearance() - expected).abs() <= 0.05 + 1e-9);
                    assert_eq!(
                        result.recommendation() == Recommendation::Heparin,
                        expected < 30.0
                    );
                }
            }
        }
    }

    #[test]
    fn serialises_with_wire_field_names() {
        let result = compute_clearance(60, 80.0, 1.0).expect("valid input");
        let json = serde_json::to_value(result).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "creatinine_clearance": 88.9,
                "recommendation": "Use Lovenox"
            })
        );
    }

    #[test]
    fn parses_rule_and_mode_names() {
        assert_eq!(
            "creatinine-cutoff".parse::<ProphylaxisRule>().unwrap(),
            ProphylaxisRule::CreatinineCutoff
        );
        assert_eq!(
            " Cockcroft-Gault ".parse::<ProphylaxisRule>().unwrap(),
            ProphylaxisRule::CockcroftGault
        );
        assert_eq!(
            "strict".parse::<ClearanceMode>().unwrap(),
            ClearanceMode::Strict
        );
        assert!("lenient".parse::<ClearanceMode>().is_err());
    }
}

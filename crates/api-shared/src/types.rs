//! JSON request and response bodies.
//!
//! Field names of `PatientDataReq`, `NoteRes`, `DvtRiskRes` and `ConsultMessageRes` are part of
//! the public contract and must not change.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RootRes {
    pub message: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

/// Patient record accepted by every patient endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientDataReq {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NoteRes {
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DvtRiskRes {
    /// Clearance in mL/min, rounded to one decimal place.
    pub creatinine_clearance: f64,
    /// `"Use Heparin"` or `"Use Lovenox"`.
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsultMessageRes {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SectionRes {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsultEntryRes {
    pub specialty: String,
    pub message: String,
}

/// Generated text to split into sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SectionsReq {
    pub text: String,
    /// Header marker; the server default applies when omitted.
    #[serde(default)]
    pub marker: Option<String>,
    /// Consult pair token; the server default applies when omitted.
    #[serde(default)]
    pub pair_token: Option<String>,
    /// Title of the section holding consult pairs.
    #[serde(default)]
    pub consult_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SectionsRes {
    /// Sections in input order, with drug and disposition recommendations emphasised.
    pub sections: Vec<SectionRes>,
    /// Pairs from the consult section; absent when there is no such section or it is malformed.
    pub consults: Option<Vec<ConsultEntryRes>>,
    pub warnings: Vec<String>,
}

/// Drafting request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DraftReq {
    pub patient: PatientDataReq,
    /// Any of `note`, `disposition`, `prophylaxis`, `consult`. Empty selects all.
    #[serde(default)]
    pub tasks: Vec<String>,
    /// `cockcroft-gault` or `creatinine-cutoff`; the server default applies when omitted.
    #[serde(default)]
    pub prophylaxis_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DraftRes {
    pub prompt: String,
    pub raw_output: String,
    pub sections: Vec<SectionRes>,
    pub note: Option<SectionRes>,
    pub disposition: Option<SectionRes>,
    pub prophylaxis: Option<SectionRes>,
    pub consult_section: Option<SectionRes>,
    pub consults: Option<Vec<ConsultEntryRes>>,
    pub clearance: Option<DvtRiskRes>,
    pub warnings: Vec<String>,
}

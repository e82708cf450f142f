//! # Scribe Core
//!
//! Core logic for the clinical scribe assistant.
//!
//! This crate contains pure operations and the drafting workflow:
//! - Renal clearance estimate and the Heparin/Lovenox recommendation (`clearance`)
//! - Best-effort splitting of generated text into titled sections and consult pairs (`sections`)
//! - Emphasis of drug and disposition recommendations (`highlight`)
//! - Configuration-driven prompt assembly (`prompt`)
//! - The drafting round trip against an injected generation service (`draft`, `generation`)
//!
//! **No API concerns**: HTTP servers, the chat-completion client and request/response schemas
//! belong in `api-rest`, `scribe-chat` and `api-shared`.

pub mod clearance;
pub mod config;
pub mod constants;
pub mod draft;
pub mod error;
pub mod generation;
pub mod highlight;
pub mod patient;
pub mod prompt;
pub mod sections;

pub use clearance::{
    compute_clearance, compute_clearance_with_mode, ClearanceMode, ClearanceResult,
    PatientVitals, ProphylaxisRule, Recommendation,
};
pub use config::{scribe_config_from_env_values, ScribeConfig, ScribeEnv};
pub use draft::{ClinicalDraft, DraftService};
pub use error::{ScribeError, ScribeResult};
pub use generation::{GenerationError, GenerationService, StaticGenerator};
pub use highlight::{highlight_disposition_status, highlight_drug_recommendation};
pub use patient::{admission_summary, consult_request, PatientRecord};
pub use prompt::{DraftTask, PromptPlan};
pub use sections::{split_consult_entries, split_sections, ConsultEntry, Section, SectionedDocument};

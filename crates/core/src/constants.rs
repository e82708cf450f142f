//! Constants used throughout the scribe core crate.
//!
//! Thresholds, recommendation labels and the default literal tokens that the prompt asks the
//! model to emit live here so the calculator, prompt plan and parser agree on them.

/// Numerator offset of the Cockcroft-Gault estimate (`140 - age`).
pub const CLEARANCE_AGE_OFFSET: f64 = 140.0;

/// Denominator factor of the Cockcroft-Gault estimate (`72 * creatinine`).
pub const CLEARANCE_CREATININE_FACTOR: f64 = 72.0;

/// Clearance (mL/min) below which heparin is recommended. Exactly 30 selects Lovenox.
pub const HEPARIN_CLEARANCE_THRESHOLD: f64 = 30.0;

/// Serum creatinine (mg/dL) above which the prompt-text rule asks for heparin.
pub const HEPARIN_CREATININE_CUTOFF: f64 = 2.0;

/// Recommendation label for heparin.
pub const USE_HEPARIN: &str = "Use Heparin";

/// Recommendation label for enoxaparin (Lovenox).
pub const USE_LOVENOX: &str = "Use Lovenox";

/// Default header marker requested in prompts and used to split generated text.
pub const DEFAULT_SECTION_MARKER: &str = "###";

/// Default token wrapping each specialty name inside the consult section.
pub const DEFAULT_CONSULT_TOKEN: &str = "**";

/// Emphasis marker applied by the highlighting routines.
pub const EMPHASIS: &str = "**";

//! Prompt assembly from a configured set of drafting tasks.
//!
//! A prompt is a sequence of named blocks (patient details, task list, one block per task). Blocks
//! that have nothing to say are omitted rather than rendered blank. Each task tells the model to
//! open its section with `{marker} {title}` so that [`crate::sections::split_sections`] can find it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clearance::{ClearanceResult, ProphylaxisRule};
use crate::constants::{DEFAULT_CONSULT_TOKEN, DEFAULT_SECTION_MARKER, HEPARIN_CREATININE_CUTOFF};
use crate::patient::PatientRecord;
use crate::{ScribeError, ScribeResult};

/// One drafting task the model is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftTask {
    Note,
    Disposition,
    Prophylaxis,
    Consult,
}

impl DraftTask {
    pub const ALL: [DraftTask; 4] = [
        DraftTask::Note,
        DraftTask::Disposition,
        DraftTask::Prophylaxis,
        DraftTask::Consult,
    ];

    /// Section title the model is asked to emit after the marker.
    pub fn title(&self) -> &'static str {
        match self {
            DraftTask::Note => "Admission Note",
            DraftTask::Disposition => "Disposition",
            DraftTask::Prophylaxis => "DVT Prophylaxis",
            DraftTask::Consult => "Consult Messages",
        }
    }
}

impl fmt::Display for DraftTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for DraftTask {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "note" => Ok(DraftTask::Note),
            "disposition" => Ok(DraftTask::Disposition),
            "prophylaxis" | "dvt" => Ok(DraftTask::Prophylaxis),
            "consult" | "consults" => Ok(DraftTask::Consult),
            other => Err(ScribeError::InvalidInput(format!(
                "unknown task '{other}' (expected note, disposition, prophylaxis or consult)"
            ))),
        }
    }
}

/// Which tasks to request and which literal tokens the reply should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPlan {
    tasks: Vec<DraftTask>,
    marker: String,
    pair_token: String,
    prophylaxis_rule: ProphylaxisRule,
}

impl PromptPlan {
    /// Creates a plan. Repeated tasks are collapsed, keeping first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::InvalidInput` if no task is selected, either token is blank or the
    /// two tokens are identical.
    pub fn new(
        tasks: impl IntoIterator<Item = DraftTask>,
        marker: impl Into<String>,
        pair_token: impl Into<String>,
        prophylaxis_rule: ProphylaxisRule,
    ) -> ScribeResult<Self> {
        let mut unique = Vec::new();
        for task in tasks {
            if !unique.contains(&task) {
                unique.push(task);
            }
        }
        if unique.is_empty() {
            return Err(ScribeError::InvalidInput(
                "at least one drafting task must be selected".into(),
            ));
        }

        let marker = marker.into();
        let pair_token = pair_token.into();
        if marker.trim().is_empty() || pair_token.trim().is_empty() {
            return Err(ScribeError::InvalidInput(
                "section marker and consult token cannot be empty".into(),
            ));
        }
        if marker == pair_token {
            return Err(ScribeError::InvalidInput(
                "section marker and consult token must differ".into(),
            ));
        }

        Ok(Self {
            tasks: unique,
            marker,
            pair_token,
            prophylaxis_rule,
        })
    }

    pub fn tasks(&self) -> &[DraftTask] {
        &self.tasks
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn pair_token(&self) -> &str {
        &self.pair_token
    }

    pub fn prophylaxis_rule(&self) -> ProphylaxisRule {
        self.prophylaxis_rule
    }

    pub fn includes(&self, task: DraftTask) -> bool {
        self.tasks.contains(&task)
    }

    /// Renders the prompt text for `record`.
    ///
    /// `clearance` is stated to the model as a computed fact when the plan uses the
    /// Cockcroft-Gault rule; it is ignored under the creatinine-cutoff rule.
    pub fn render(&self, record: &PatientRecord, clearance: Option<&ClearanceResult>) -> String {
        let task_blocks = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                format!(
                    "{}. {} {}\n{}",
                    i + 1,
                    self.marker,
                    task.title(),
                    self.instruction(*task, clearance)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let blocks = [
            Some(
                "You are assisting a hospital clinician with admission documentation.".to_string(),
            ),
            Some(patient_block(record)),
            Some(format!(
                "Complete the following tasks. Begin each section with a line containing \
                 \"{} \" followed by the section title exactly as written below.",
                self.marker
            )),
            Some(task_blocks),
        ];

        blocks.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
    }

    fn instruction(&self, task: DraftTask, clearance: Option<&ClearanceResult>) -> String {
        match task {
            DraftTask::Note => "Write a concise admission history and physical note summarising \
                                the presentation, assessment and plan."
                .to_string(),
            DraftTask::Disposition => "Recommend a disposition. Include a line of the form \
                                       \"Disposition: Inpatient\" or \"Disposition: Observation\" \
                                       followed by a brief justification."
                .to_string(),
            DraftTask::Prophylaxis => match (self.prophylaxis_rule, clearance) {
                (ProphylaxisRule::CockcroftGault, Some(result)) => format!(
                    "Estimated creatinine clearance is {:.1} mL/min (Cockcroft-Gault). On that \
                     basis the DVT prophylaxis is {}. State it as \"recommend {}\" and add any \
                     bleeding or clotting considerations.",
                    result.creatinine_clearance(),
                    result.recommendation().drug(),
                    result.recommendation().drug()
                ),
                (ProphylaxisRule::CockcroftGault, None) => "Recommend DVT prophylaxis with \
                                                            Heparin or Lovenox, phrased as \
                                                            \"recommend Heparin\" or \
                                                            \"recommend Lovenox\"."
                    .to_string(),
                (ProphylaxisRule::CreatinineCutoff, _) => format!(
                    "Recommend DVT prophylaxis: if serum creatinine is greater than \
                     {HEPARIN_CREATININE_CUTOFF:.1} mg/dL recommend Heparin, otherwise recommend \
                     Lovenox. Phrase it as \"recommend Heparin\" or \"recommend Lovenox\"."
                ),
            },
            DraftTask::Consult => format!(
                "Draft a brief consult message for each specialty that should be involved. Write \
                 one per line in the form {tok}Specialty{tok}: message.",
                tok = self.pair_token
            ),
        }
    }
}

impl Default for PromptPlan {
    fn default() -> Self {
        Self {
            tasks: DraftTask::ALL.to_vec(),
            marker: DEFAULT_SECTION_MARKER.to_string(),
            pair_token: DEFAULT_CONSULT_TOKEN.to_string(),
            prophylaxis_rule: ProphylaxisRule::default(),
        }
    }
}

fn patient_block(record: &PatientRecord) -> String {
    let codes = (!record.diagnosis_codes.is_empty())
        .then(|| format!("- Diagnosis codes: {}", record.diagnosis_codes.join(", ")));
    let notes = record
        .prior_notes()
        .map(|notes| format!("- Prior notes: {notes}"));

    let lines = [
        Some("Patient details:".to_string()),
        Some(format!("- Name: {}", record.name.trim())),
        Some(format!("- Age: {} years", record.age)),
        Some(format!("- Weight: {} kg", record.weight_kg)),
        Some(format!("- Serum creatinine: {} mg/dL", record.creatinine)),
        Some(format!(
            "- Admitting diagnosis: {}",
            record.admitting_diagnosis.trim()
        )),
        codes,
        notes,
    ];

    lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clearance::compute_clearance;
    use crate::patient::sample_record;

    #[test]
    fn default_plan_requests_every_section_with_marker() {
        let plan = PromptPlan::default();
        let prompt = plan.render(&sample_record(), None);
        for task in DraftTask::ALL {
            assert!(prompt.contains(&format!("### {}", task.title())), "{task}");
        }
        assert!(prompt.contains("**Specialty**: message"));
    }

    #[test]
    fn unselected_tasks_are_omitted() {
        let plan = PromptPlan::new(
            [DraftTask::Note, DraftTask::Consult],
            "@@@",
            "__",
            ProphylaxisRule::CockcroftGault,
        )
        .expect("valid plan");
        let prompt = plan.render(&sample_record(), None);
        assert!(prompt.contains("1. @@@ Admission Note"));
        assert!(prompt.contains("2. @@@ Consult Messages"));
        assert!(!prompt.contains("Disposition"));
        assert!(prompt.contains("__Specialty__: message"));
    }

    #[test]
    fn duplicate_tasks_collapse_in_order() {
        let plan = PromptPlan::new(
            [DraftTask::Consult, DraftTask::Note, DraftTask::Consult],
            "###",
            "**",
            ProphylaxisRule::default(),
        )
        .expect("valid plan");
        assert_eq!(plan.tasks(), &[DraftTask::Consult, DraftTask::Note]);
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = PromptPlan::new(Vec::new(), "###", "**", ProphylaxisRule::default())
            .expect_err("no tasks");
        assert!(matches!(err, ScribeError::InvalidInput(_)));
        assert!(PromptPlan::new([DraftTask::Note], " ", "**", ProphylaxisRule::default()).is_err());
    }

    #[test]
    fn identical_marker_and_pair_token_are_rejected() {
        let err = PromptPlan::new([DraftTask::Consult], "**", "**", ProphylaxisRule::default())
            .expect_err("tokens collide");
        assert!(matches!(err, ScribeError::InvalidInput(msg) if msg.contains("differ")));
    }

    #[test]
    fn computed_rule_states_clearance() {
        let clearance = compute_clearance(60, 80.0, 4.0).expect("valid input");
        let prompt = PromptPlan::default().render(&sample_record(), Some(&clearance));
        assert!(prompt.contains("22.2 mL/min"));
        assert!(prompt.contains("\"recommend Heparin\""));
        assert!(!prompt.contains("greater than 2.0"));
    }

    #[test]
    fn cutoff_rule_is_prompt_text_only() {
        let plan = PromptPlan::new(
            [DraftTask::Prophylaxis],
            "###",
            "**",
            ProphylaxisRule::CreatinineCutoff,
        )
        .expect("valid plan");
        let clearance = compute_clearance(60, 80.0, 4.0).expect("valid input");
        let prompt = plan.render(&sample_record(), Some(&clearance));
        assert!(prompt.contains("greater than 2.0 mg/dL"));
        assert!(!prompt.contains("mL/min"));
    }

    #[test]
    fn patient_block_skips_missing_optional_fields() {
        let record = PatientRecord {
            diagnosis_codes: Vec::new(),
            prior_notes: None,
            ..sample_record()
        };
        let prompt = PromptPlan::default().render(&record, None);
        assert!(!prompt.contains("Diagnosis codes"));
        assert!(!prompt.contains("Prior notes"));
        assert!(!prompt.contains("\n\n\n"));

        let prompt = PromptPlan::default().render(&sample_record(), None);
        assert!(prompt.contains("- Diagnosis codes: J18.9"));
        assert!(prompt.contains("- Prior notes: Seen in clinic last week."));
    }

    #[test]
    fn parses_task_names() {
        assert_eq!("Consult".parse::<DraftTask>().unwrap(), DraftTask::Consult);
        assert_eq!("dvt".parse::<DraftTask>().unwrap(), DraftTask::Prophylaxis);
        assert!("billing".parse::<DraftTask>().is_err());
    }
}

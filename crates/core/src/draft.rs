//! Drafting: prompt → generation → sections.
//!
//! A draft makes exactly one generation call. Everything after the call is best effort: each
//! requested task's section is looked up by title and is `None` when the model did not produce
//! it, so rendering never has to index into the reply.

use std::sync::Arc;

use serde::Serialize;

use crate::clearance::{compute_clearance_with_mode, ClearanceResult};
use crate::config::ScribeConfig;
use crate::generation::GenerationService;
use crate::highlight::{highlight_disposition_status, highlight_drug_recommendation};
use crate::patient::PatientRecord;
use crate::prompt::{DraftTask, PromptPlan};
use crate::sections::{
    split_consult_entries, split_sections, ConsultEntry, Section, SectionedDocument,
};
use crate::ScribeResult;

/// Parsed result of one drafting round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalDraft {
    pub prompt: String,
    pub raw_output: String,
    /// Every section found in the reply, in reply order.
    pub document: SectionedDocument,
    pub note: Option<Section>,
    /// Disposition section with the status emphasised.
    pub disposition: Option<Section>,
    /// Prophylaxis section with drug recommendations emphasised.
    pub prophylaxis: Option<Section>,
    pub consult_section: Option<Section>,
    /// `None` when the consult section is absent or its pairs could not be matched.
    pub consults: Option<Vec<ConsultEntry>>,
    /// Computed clearance, present only under the Cockcroft-Gault rule.
    pub clearance: Option<ClearanceResult>,
    pub warnings: Vec<String>,
}

/// Runs drafting rounds against an injected generation service.
#[derive(Clone)]
pub struct DraftService {
    cfg: Arc<ScribeConfig>,
    generator: Arc<dyn GenerationService>,
}

impl DraftService {
    pub fn new(cfg: Arc<ScribeConfig>, generator: Arc<dyn GenerationService>) -> Self {
        Self { cfg, generator }
    }

    /// Builds the prompt for `record`, calls the generator once and parses the reply.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::InvalidInput` if the record is incomplete or, under the
    /// Cockcroft-Gault rule with prophylaxis requested, the calculator rejects the vitals.
    /// Returns `ScribeError::Generation` if the generation call fails. A reply that does not
    /// follow the requested layout is not an error.
    pub async fn draft(
        &self,
        record: &PatientRecord,
        plan: &PromptPlan,
    ) -> ScribeResult<ClinicalDraft> {
        record.validate()?;

        let computes_clearance =
            plan.prophylaxis_rule().is_computed() && plan.includes(DraftTask::Prophylaxis);
        let clearance = if computes_clearance {
            Some(compute_clearance_with_mode(
                &record.vitals(),
                self.cfg.clearance_mode(),
            )?)
        } else {
            None
        };

        let prompt = plan.render(record, clearance.as_ref());
        tracing::info!(
            "requesting draft with {} task(s), prompt length {}",
            plan.tasks().len(),
            prompt.len()
        );

        let raw_output = self.generator.generate(&prompt).await?;

        Ok(parse_draft(prompt, raw_output, plan, clearance))
    }
}

/// Maps a generated reply onto the plan's tasks.
pub fn parse_draft(
    prompt: String,
    raw_output: String,
    plan: &PromptPlan,
    clearance: Option<ClearanceResult>,
) -> ClinicalDraft {
    let document = split_sections(&raw_output, plan.marker());
    let mut warnings = Vec::new();

    let mut section_for = |task: DraftTask| -> Option<Section> {
        if !plan.includes(task) {
            return None;
        }
        let found = document.find(task.title()).cloned();
        if found.is_none() {
            tracing::warn!("generated text has no '{}' section", task.title());
            warnings.push(format!("missing section: {}", task.title()));
        }
        found
    };

    let note = section_for(DraftTask::Note);
    let disposition = section_for(DraftTask::Disposition).map(|mut section| {
        section.body = highlight_disposition_status(&section.body);
        section
    });
    let prophylaxis = section_for(DraftTask::Prophylaxis).map(|mut section| {
        section.body = highlight_drug_recommendation(&section.body);
        section
    });
    let consult_section = section_for(DraftTask::Consult);

    let consults = match &consult_section {
        Some(section) => match split_consult_entries(&section.body, plan.pair_token()) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!("consult section left unparsed: {}", e);
                warnings.push(e.to_string());
                None
            }
        },
        None => None,
    };

    ClinicalDraft {
        prompt,
        raw_output,
        document,
        note,
        disposition,
        prophylaxis,
        consult_section,
        consults,
        clearance,
        warnings,
    }
}

//! Conversions between wire types and core types.

use api_shared::{ConsultEntryRes, DraftRes, DvtRiskRes, PatientDataReq, SectionRes};
use scribe_core::{ClearanceResult, ClinicalDraft, ConsultEntry, PatientRecord, Section};

pub(crate) fn patient_record(req: PatientDataReq) -> PatientRecord {
    PatientRecord {
        name: req.name,
        age: req.age,
        weight_kg: req.weight_kg,
        creatinine: req.creatinine,
        admitting_diagnosis: req.admitting_diagnosis,
        diagnosis_codes: req.diagnosis_codes,
        prior_notes: req.prior_notes,
    }
}

pub(crate) fn section_res(section: Section) -> SectionRes {
    SectionRes {
        title: section.title,
        body: section.body,
    }
}

pub(crate) fn consult_res(entry: ConsultEntry) -> ConsultEntryRes {
    ConsultEntryRes {
        specialty: entry.specialty,
        message: entry.message,
    }
}

pub(crate) fn dvt_risk_res(result: &ClearanceResult) -> DvtRiskRes {
    DvtRiskRes {
        creatinine_clearance: result.creatinine_clearance(),
        recommendation: result.recommendation().label().to_string(),
    }
}

pub(crate) fn draft_res(draft: ClinicalDraft) -> DraftRes {
    DraftRes {
        prompt: draft.prompt,
        raw_output: draft.raw_output,
        sections: draft
            .document
            .into_sections()
            .into_iter()
            .map(section_res)
            .collect(),
        note: draft.note.map(section_res),
        disposition: draft.disposition.map(section_res),
        prophylaxis: draft.prophylaxis.map(section_res),
        consult_section: draft.consult_section.map(section_res),
        consults: draft
            .consults
            .map(|entries| entries.into_iter().map(consult_res).collect()),
        clearance: draft.clearance.as_ref().map(dvt_risk_res),
        warnings: draft.warnings,
    }
}

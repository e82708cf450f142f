//! HTTP handlers.
//!
//! Handlers map wire types onto `scribe-core` calls and core errors onto status codes. Every
//! error is logged before it is returned.

use axum::{extract::State, http::StatusCode, response::Json};

use api_shared::{
    ConsultMessageRes, DraftReq, DraftRes, DvtRiskRes, ErrorRes, HealthRes, HealthService,
    NoteRes, PatientDataReq, RootRes, SectionsReq, SectionsRes,
};
use scribe_core::{
    admission_summary, compute_clearance_with_mode, consult_request,
    highlight_disposition_status, highlight_drug_recommendation, split_consult_entries,
    split_sections, DraftTask, ProphylaxisRule, ScribeError,
};

use crate::mapping::{consult_res, draft_res, dvt_risk_res, patient_record, section_res};
use crate::AppState;

pub(crate) type ApiError = (StatusCode, Json<ErrorRes>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            detail: detail.into(),
        }),
    )
}

/// Maps core errors onto HTTP statuses: bad input is 422, generation failures are 502.
fn scribe_error(context: &str, e: ScribeError) -> ApiError {
    match e {
        ScribeError::InvalidInput(_) | ScribeError::MalformedConsultSection { .. } => {
            tracing::warn!("{} rejected: {}", context, e);
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        ScribeError::Generation(_) => {
            tracing::error!("{} error: {:?}", context, e);
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Liveness message", body = RootRes)
    )
)]
pub(crate) async fn root() -> Json<RootRes> {
    Json(RootRes {
        message: "API is working!".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/generate-note/",
    request_body = PatientDataReq,
    responses(
        (status = 200, description = "Admission summary", body = NoteRes),
        (status = 422, description = "Invalid patient record", body = ErrorRes)
    )
)]
/// One-line admission summary built from the record without calling the generation service.
#[axum::debug_handler]
pub(crate) async fn generate_note(
    Json(req): Json<PatientDataReq>,
) -> Result<Json<NoteRes>, ApiError> {
    let record = patient_record(req);
    record
        .validate()
        .map_err(|e| scribe_error("Generate note", e))?;
    Ok(Json(NoteRes {
        note: admission_summary(&record),
    }))
}

#[utoipa::path(
    post,
    path = "/dvt-risk/",
    request_body = PatientDataReq,
    responses(
        (status = 200, description = "Creatinine clearance and prophylaxis recommendation", body = DvtRiskRes),
        (status = 422, description = "Invalid vitals (e.g. creatinine not above 0)", body = ErrorRes)
    )
)]
/// Cockcroft-Gault clearance and the Heparin/Lovenox recommendation.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if the configured validation mode rejects the vitals.
#[axum::debug_handler]
pub(crate) async fn dvt_risk(
    State(state): State<AppState>,
    Json(req): Json<PatientDataReq>,
) -> Result<Json<DvtRiskRes>, ApiError> {
    let record = patient_record(req);
    let result = compute_clearance_with_mode(&record.vitals(), state.cfg.clearance_mode())
        .map_err(|e| scribe_error("DVT risk", e))?;
    Ok(Json(dvt_risk_res(&result)))
}

#[utoipa::path(
    post,
    path = "/consult-message/",
    request_body = PatientDataReq,
    responses(
        (status = 200, description = "Consult request opener", body = ConsultMessageRes),
        (status = 422, description = "Invalid patient record", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn consult_message(
    Json(req): Json<PatientDataReq>,
) -> Result<Json<ConsultMessageRes>, ApiError> {
    let record = patient_record(req);
    record
        .validate()
        .map_err(|e| scribe_error("Consult message", e))?;
    Ok(Json(ConsultMessageRes {
        message: consult_request(&record),
    }))
}

#[utoipa::path(
    post,
    path = "/sections/",
    request_body = SectionsReq,
    responses(
        (status = 200, description = "Sections with recommendations emphasised", body = SectionsRes),
        (status = 422, description = "Marker and pair token are blank or identical", body = ErrorRes)
    )
)]
/// Splits already generated text into sections and consult pairs.
///
/// Never fails on malformed text: a consult section that cannot be paired is reported in
/// `warnings` and `consults` is omitted.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if the marker or pair token is blank or both are identical.
#[axum::debug_handler]
pub(crate) async fn sections(
    State(state): State<AppState>,
    Json(req): Json<SectionsReq>,
) -> Result<Json<SectionsRes>, ApiError> {
    let marker = req
        .marker
        .unwrap_or_else(|| state.cfg.section_marker().to_string());
    let pair_token = req
        .pair_token
        .unwrap_or_else(|| state.cfg.consult_token().to_string());
    let consult_title = req
        .consult_title
        .unwrap_or_else(|| DraftTask::Consult.title().to_string());

    if marker.trim().is_empty() || pair_token.trim().is_empty() {
        return Err(scribe_error(
            "Sections",
            ScribeError::InvalidInput("section marker and consult token cannot be empty".into()),
        ));
    }
    if marker == pair_token {
        return Err(scribe_error(
            "Sections",
            ScribeError::InvalidInput("section marker and consult token must differ".into()),
        ));
    }

    let document = split_sections(&req.text, &marker);
    let mut warnings = Vec::new();

    let consults = match document.find(&consult_title) {
        Some(section) => match split_consult_entries(&section.body, &pair_token) {
            Ok(entries) => Some(entries.into_iter().map(consult_res).collect()),
            Err(e) => {
                tracing::warn!("Sections: consult section left unparsed: {}", e);
                warnings.push(e.to_string());
                None
            }
        },
        None => None,
    };

    let sections = document
        .into_sections()
        .into_iter()
        .map(|mut section| {
            section.body =
                highlight_drug_recommendation(&highlight_disposition_status(&section.body));
            section_res(section)
        })
        .collect();

    Ok(Json(SectionsRes {
        sections,
        consults,
        warnings,
    }))
}

#[utoipa::path(
    post,
    path = "/draft/",
    request_body = DraftReq,
    responses(
        (status = 200, description = "Generated and parsed draft", body = DraftRes),
        (status = 422, description = "Invalid record, task or rule", body = ErrorRes),
        (status = 502, description = "Generation service failed", body = ErrorRes),
        (status = 503, description = "Generation service not configured", body = ErrorRes)
    )
)]
/// Builds the prompt, calls the generation service once and returns the parsed sections.
///
/// # Errors
/// Returns:
/// - `422 Unprocessable Entity` for an invalid record, unknown task or unknown rule,
/// - `502 Bad Gateway` if the generation call fails,
/// - `503 Service Unavailable` if no generation service is configured.
#[axum::debug_handler]
pub(crate) async fn draft(
    State(state): State<AppState>,
    Json(req): Json<DraftReq>,
) -> Result<Json<DraftRes>, ApiError> {
    let Some(drafts) = state.drafts.as_ref() else {
        tracing::warn!("Draft requested but no generation service is configured");
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "generation service is not configured",
        ));
    };

    let tasks = req
        .tasks
        .iter()
        .map(|t| t.parse::<DraftTask>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| scribe_error("Draft", e))?;
    let rule = req
        .prophylaxis_rule
        .as_deref()
        .map(str::parse::<ProphylaxisRule>)
        .transpose()
        .map_err(|e| scribe_error("Draft", e))?;
    let plan = state
        .cfg
        .plan(&tasks, rule)
        .map_err(|e| scribe_error("Draft", e))?;

    let record = patient_record(req.patient);
    let draft = drafts
        .draft(&record, &plan)
        .await
        .map_err(|e| scribe_error("Draft", e))?;

    Ok(Json(draft_res(draft)))
}

//! Axum route handlers for the Ranking API.

use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{DocumentFailure, RankingSession};
use crate::report::{export_csv, ReportError, EXPORT_FILENAME};
use crate::screening::pipeline::{run_ranking, with_timeout, RankingRequest, Upload};
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUME_FILES_FIELD: &str = "resume_files";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RankedRow {
    pub rank: usize,
    pub filename: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub ranked: Vec<RankedRow>,
    pub failures: Vec<DocumentFailure>,
}

impl From<&RankingSession> for RankingResponse {
    fn from(session: &RankingSession) -> Self {
        Self {
            session_id: session.id,
            created_at: session.created_at,
            ranked: session
                .ranked
                .iter()
                .enumerate()
                .map(|(index, candidate)| RankedRow {
                    rank: index + 1,
                    filename: candidate.filename.clone(),
                    name: candidate.name.clone(),
                    email: candidate.email.clone(),
                    score: candidate.score,
                })
                .collect(),
            failures: session.failures.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rankings
///
/// Multipart form: `job_description` text field plus one or more `resume_files`.
/// Ranks the résumés and stores the result as a new session.
pub async fn handle_create_ranking(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let request = read_ranking_form(multipart).await?;

    let limit = Duration::from_secs(state.config.processing_timeout_secs);
    let session = with_timeout(limit, run_ranking(&state, request)).await?;

    Ok(Json(RankingResponse::from(session.as_ref())))
}

/// GET /api/v1/rankings/:session_id
pub async fn handle_get_ranking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<RankingResponse>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ranking session {session_id} not found")))?;
    Ok(Json(RankingResponse::from(session.as_ref())))
}

/// GET /api/v1/rankings/:session_id/export
///
/// Downloads the session as `ranked_resumes.csv`.
pub async fn handle_export_ranking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ranking session {session_id} not found")))?;
    csv_download(&session)
}

/// GET /api/v1/export/latest
///
/// Downloads whatever was ranked most recently. Client error when nothing has been ranked.
pub async fn handle_export_latest(State(state): State<AppState>) -> Result<Response, AppError> {
    let session = state
        .sessions
        .latest()
        .await
        .ok_or(AppError::Report(ReportError::NoData))?;
    csv_download(&session)
}

fn csv_download(session: &RankingSession) -> Result<Response, AppError> {
    let body = export_csv(&session.ranked)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_ranking_form(mut multipart: Multipart) -> Result<RankingRequest, AppError> {
    let mut job_description = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = Some(field.text().await?);
            }
            Some(RESUME_FILES_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers submit an empty part when no file was picked.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                uploads.push(Upload { filename, bytes });
            }
            other => debug!("Ignoring unexpected form field {other:?}"),
        }
    }

    let job_description = job_description.ok_or_else(|| {
        AppError::Validation(format!("'{JOB_DESCRIPTION_FIELD}' field is required"))
    })?;

    Ok(RankingRequest {
        job_description,
        uploads,
    })
}

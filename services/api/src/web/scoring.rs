//! services/api/src/web/scoring.rs
//!
//! Axum handlers for text, free-text answer and speech scoring.

use crate::error::reject;
use crate::web::rest::{
    CompositeScoreResponse, GradeAnswerRequest, ScoreTextRequest, ScoringResultResponse,
    SpeechScoreResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use classroom_core::policy::DEFAULT_TOLERANCE;
use classroom_core::scoring::{score_speech, score_text};
use std::sync::Arc;

/// Score a typed or transcribed text against the expected text.
#[utoipa::path(
    post,
    path = "/scoring/text",
    tag = "Scoring",
    request_body = ScoreTextRequest,
    responses(
        (status = 200, description = "Word-level accuracy", body = ScoringResultResponse)
    )
)]
pub async fn score_text_handler(
    Json(payload): Json<ScoreTextRequest>,
) -> Json<ScoringResultResponse> {
    let tolerance = payload.tolerance.unwrap_or(DEFAULT_TOLERANCE);
    Json(score_text(&payload.original, &payload.spoken, tolerance).into())
}

/// Grade an open-ended answer with keyword, semantic and text-accuracy signals.
#[utoipa::path(
    post,
    path = "/scoring/answer",
    tag = "Scoring",
    request_body = GradeAnswerRequest,
    responses(
        (status = 200, description = "Composite score", body = CompositeScoreResponse),
        (status = 502, description = "The similarity service is unavailable")
    )
)]
pub async fn grade_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GradeAnswerRequest>,
) -> Result<Json<CompositeScoreResponse>, (StatusCode, String)> {
    let score = app_state
        .grader
        .grade_answer(&payload.answer, &payload.my_answer, &payload.key_words)
        .await
        .map_err(|e| reject("Failed to grade answer", e))?;
    Ok(Json(score.into()))
}

/// Transcribe a spoken answer and score it against the expected text.
///
/// Accepts multipart/form-data with an `audio` part (WAV or raw 16-bit PCM at 48 kHz),
/// an `expected_text` part and an optional `tolerance` part.
#[utoipa::path(
    post,
    path = "/scoring/speech",
    tag = "Scoring",
    request_body(content_type = "multipart/form-data", description = "Audio and the expected text."),
    responses(
        (status = 200, description = "Transcript and accuracy", body = SpeechScoreResponse),
        (status = 400, description = "Missing audio or expected text"),
        (status = 502, description = "The transcription service is unavailable")
    )
)]
pub async fn score_speech_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SpeechScoreResponse>, (StatusCode, String)> {
    let mut audio: Option<Vec<u8>> = None;
    let mut expected_text: Option<String> = None;
    let mut tolerance = DEFAULT_TOLERANCE;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read audio bytes: {}", e),
                    )
                })?;
                audio = Some(data.to_vec());
            }
            "expected_text" => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("expected_text is not valid UTF-8 text: {}", e),
                    )
                })?;
                expected_text = Some(text);
            }
            "tolerance" => {
                let raw = field.text().await.unwrap_or_default();
                tolerance = raw.trim().parse().map_err(|_| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Invalid tolerance '{}'", raw),
                    )
                })?;
            }
            _ => {}
        }
    }

    let audio = audio.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include an audio part".to_string(),
        )
    })?;
    let expected_text = expected_text.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include expected_text".to_string(),
        )
    })?;

    let score = score_speech(app_state.sst_adapter.as_ref(), &audio, &expected_text, tolerance)
        .await
        .map_err(|e| reject("Failed to score speech", e))?;
    Ok(Json(score.into()))
}

use axum::{extract::State, Json};
use serde::Serialize;

use crate::drafting::generator::{
    generate_draft, merge_additional_info, suggest_attributes, transform_tone, DraftOutcome,
    DraftRequest, MergeRequest, SuggestRequest, ToneRequest,
};
use crate::errors::AppError;
use crate::normalize::attributes::ListingAttributes;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// POST /api/generate-draft
pub async fn handle_generate_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<DraftOutcome>, AppError> {
    let outcome = generate_draft(state.generator.as_ref(), req).await?;
    Ok(Json(outcome))
}

/// POST /api/modify-content
pub async fn handle_modify_content(
    State(state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<ContentResponse>, AppError> {
    let additional_info = req.resolved_additional_info();
    let content =
        merge_additional_info(state.generator.as_ref(), &req.existing_content, &additional_info)
            .await?;
    Ok(Json(ContentResponse { content }))
}

/// POST /api/transform-tone
pub async fn handle_transform_tone(
    State(state): State<AppState>,
    Json(req): Json<ToneRequest>,
) -> Result<Json<ContentResponse>, AppError> {
    let content = transform_tone(state.generator.as_ref(), &req.content, req.tone).await?;
    Ok(Json(ContentResponse { content }))
}

/// POST /api/suggest-attributes
pub async fn handle_suggest_attributes(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<ListingAttributes>, AppError> {
    let suggested = suggest_attributes(state.generator.as_ref(), req).await?;
    Ok(Json(suggested))
}

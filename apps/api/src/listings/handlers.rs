use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::listing::{ListingChanges, ListingColumns, ListingRow};
use crate::normalize::additional_info::format_additional_info;
use crate::routes::preview::AdditionalInfoResponse;
use crate::state::AppState;

/// GET /api/posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingRow>>, AppError> {
    Ok(Json(state.listings.list().await?))
}

/// GET /api/posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingRow>, AppError> {
    let row = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;
    Ok(Json(row))
}

/// POST /api/posts
pub async fn handle_create_post(
    State(state): State<AppState>,
    Json(req): Json<ListingChanges>,
) -> Result<(StatusCode, Json<ListingRow>), AppError> {
    let row = state.listings.create(ListingColumns::try_from(req)?).await?;
    tracing::info!("Created post {} ({})", row.id, row.product_name);
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/posts/:id
pub async fn handle_update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ListingChanges>,
) -> Result<Json<ListingRow>, AppError> {
    let row = state
        .listings
        .update(id, ListingColumns::try_from(req)?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;
    Ok(Json(row))
}

/// GET /api/posts/:id/additional-info
/// The checklist block rendered from a saved listing's fields.
pub async fn handle_post_additional_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdditionalInfoResponse>, AppError> {
    let row = state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;
    Ok(Json(AdditionalInfoResponse::new(format_additional_info(
        &row.attributes(),
    ))))
}

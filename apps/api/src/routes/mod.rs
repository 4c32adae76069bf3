pub mod health;
pub mod preview;

use axum::{
    routing::{get, post},
    Router,
};

use crate::drafting::handlers as drafting;
use crate::listings::handlers as listings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Live preview (pure normalization)
        .route("/api/prices/parse", post(preview::handle_parse_price))
        .route("/api/prices/extract", post(preview::handle_extract_price))
        .route("/api/additional-info", post(preview::handle_additional_info))
        // Drafting (LLM)
        .route("/api/generate-draft", post(drafting::handle_generate_draft))
        .route("/api/modify-content", post(drafting::handle_modify_content))
        .route("/api/transform-tone", post(drafting::handle_transform_tone))
        .route(
            "/api/suggest-attributes",
            post(drafting::handle_suggest_attributes),
        )
        // Listings
        .route(
            "/api/posts",
            get(listings::handle_list_posts).post(listings::handle_create_post),
        )
        .route(
            "/api/posts/:id",
            get(listings::handle_get_post).patch(listings::handle_update_post),
        )
        .route(
            "/api/posts/:id/additional-info",
            get(listings::handle_post_additional_info),
        )
        .with_state(state)
}

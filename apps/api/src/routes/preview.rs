//! Live-preview endpoints: the pure normalization utilities exposed over HTTP
//! so the form can show parsed prices and the checklist block as the seller types.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::normalize::additional_info::{format_additional_info, NO_INFO_PLACEHOLDER};
use crate::normalize::attributes::ListingAttributes;
use crate::normalize::korean_price::{format_amount, parse_price_with_rate, PriceAmount};
use crate::normalize::price_extractor::{extract_price, ExtractedPrice};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsePriceRequest {
    pub input: String,
    /// KRW per USD; the configured rate when absent.
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ParsePriceResponse {
    pub price: Option<PriceAmount>,
    /// "130,000원" when parsed, otherwise the input unchanged.
    pub formatted: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractPriceRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfoResponse {
    pub content: String,
    /// True when `content` is the placeholder, i.e. nothing was entered.
    pub is_empty: bool,
}

impl AdditionalInfoResponse {
    pub fn new(content: String) -> Self {
        let is_empty = content == NO_INFO_PLACEHOLDER;
        Self { content, is_empty }
    }
}

/// POST /api/prices/parse
pub async fn handle_parse_price(
    State(state): State<AppState>,
    Json(req): Json<ParsePriceRequest>,
) -> Result<Json<ParsePriceResponse>, AppError> {
    let rate = req.exchange_rate.unwrap_or(state.config.usd_krw_rate);
    if !rate.is_finite() || rate <= 0.0 {
        return Err(AppError::Validation(
            "exchangeRate must be a positive number".to_string(),
        ));
    }

    let price = parse_price_with_rate(&req.input, rate);
    let formatted = match price {
        Some(amount) => format_amount(amount),
        None => req.input,
    };
    Ok(Json(ParsePriceResponse { price, formatted }))
}

/// POST /api/prices/extract
pub async fn handle_extract_price(
    Json(req): Json<ExtractPriceRequest>,
) -> Json<ExtractedPrice> {
    Json(extract_price(&req.description))
}

/// POST /api/additional-info
pub async fn handle_additional_info(
    Json(attrs): Json<ListingAttributes>,
) -> Json<AdditionalInfoResponse> {
    Json(AdditionalInfoResponse::new(format_additional_info(&attrs)))
}

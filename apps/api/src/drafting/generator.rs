//! Listing drafting — first drafts, merging the checklist block into a draft,
//! tone rewrites, and structured field suggestions.
//!
//! All model calls go through `TextGenerator`. `AppState` carries an
//! `Arc<dyn TextGenerator>` so handlers and tests never touch HTTP directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::drafting::prompts::{
    DRAFT_PROMPT_TEMPLATE, DRAFT_SYSTEM_TEMPLATE, MERGE_PROMPT_TEMPLATE, MERGE_SYSTEM_TEMPLATE,
    SUGGEST_PROMPT_TEMPLATE, TONE_PROMPT_TEMPLATE, TONE_SYSTEM_TEMPLATE,
};
use crate::drafting::tone::Tone;
use crate::errors::AppError;
use crate::llm_client::prompts::{
    DEFAULT_TONE_INSTRUCTION, JSON_ONLY_SYSTEM, PRESERVE_FACTS_INSTRUCTION,
};
use crate::llm_client::{LlmClient, LlmError};
use crate::normalize::additional_info::{
    format_additional_info, normalize_purchase_date, NO_INFO_PLACEHOLDER,
};
use crate::normalize::attributes::{non_blank, ListingAttributes};
use crate::normalize::korean_price::{format_amount, PriceAmount};
use crate::normalize::price_extractor::extract_price;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Prompt-in, text-out generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-form completion. Returns trimmed, non-empty text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AppError>;

    /// JSON-mode completion. Returns the parsed JSON object.
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError>;
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AppError> {
        self.call_text(prompt, system)
            .await
            .map_err(|e| llm_failure("Text generation failed", e))
    }

    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
        self.call_json::<Value>(prompt, system)
            .await
            .map_err(|e| llm_failure("JSON generation failed", e))
    }
}

fn llm_failure(context: &str, e: LlmError) -> AppError {
    if e.is_rate_limited() {
        AppError::RateLimited
    } else if e.is_unauthorized() {
        AppError::LlmAuth
    } else {
        AppError::Llm(format!("{context}: {e}"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for a first draft: structured fields plus an optional brief.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    #[serde(flatten)]
    pub attributes: ListingAttributes,
    #[serde(default)]
    pub brief_description: Option<String>,
}

/// Result of a first draft.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOutcome {
    pub draft: String,
    /// The asking price the draft was written with, including one pulled out
    /// of a "00<price>" marker in the brief.
    pub asking_price: Option<PriceAmount>,
    /// The brief with its price marker removed.
    pub cleaned_brief: Option<String>,
}

/// Request body for merging the checklist block into a draft. The block is
/// either sent as text or rendered here from the structured fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub existing_content: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub attributes: Option<ListingAttributes>,
}

impl MergeRequest {
    /// The checklist text to merge; the placeholder when nothing was entered.
    pub fn resolved_additional_info(&self) -> String {
        if let Some(text) = non_blank(self.additional_info.clone()) {
            return text;
        }
        match &self.attributes {
            Some(attrs) if !attrs.is_blank() => format_additional_info(attrs),
            _ => NO_INFO_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToneRequest {
    pub content: String,
    pub tone: Tone,
}

/// Request body for structured field suggestions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub product_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub brief_description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Writes a first draft from the structured fields and the brief.
///
/// A "00<price>" marker in the brief fills the asking price when the seller
/// left it empty; the model only sees the brief without the marker.
pub async fn generate_draft(
    generator: &dyn TextGenerator,
    request: DraftRequest,
) -> Result<DraftOutcome, AppError> {
    let mut attributes = request.attributes;
    let product_name = attributes
        .product_name
        .clone()
        .ok_or_else(|| AppError::Validation("productName is required".to_string()))?;

    let mut cleaned_brief = None;
    if let Some(brief) = non_blank(request.brief_description) {
        let extracted = extract_price(&brief);
        if let Some(price) = extracted.price {
            info!("Price marker found in brief: {price}");
            if attributes.asking_price.is_none() {
                attributes.asking_price = Some(price);
            }
        }
        cleaned_brief = non_blank(Some(extracted.cleaned_description));
    }

    let system = DRAFT_SYSTEM_TEMPLATE.replace("{tone_instruction}", DEFAULT_TONE_INSTRUCTION);
    let prompt = DRAFT_PROMPT_TEMPLATE.replace(
        "{product_lines}",
        &product_lines(&product_name, &attributes, cleaned_brief.as_deref()),
    );

    info!("Generating draft for '{product_name}'");
    let draft = generator.complete(&system, &prompt).await?;

    Ok(DraftOutcome {
        draft,
        asking_price: attributes.asking_price,
        cleaned_brief,
    })
}

/// Merges the checklist block into an existing draft.
///
/// The placeholder sentinel means nothing was entered: the draft comes back
/// unchanged and the model is not called. With no draft, the block stands alone.
pub async fn merge_additional_info(
    generator: &dyn TextGenerator,
    existing_content: &str,
    additional_info: &str,
) -> Result<String, AppError> {
    let additional_info = additional_info.trim();
    if additional_info.is_empty() || additional_info == NO_INFO_PLACEHOLDER {
        return Ok(existing_content.to_string());
    }
    let existing_content = existing_content.trim();
    if existing_content.is_empty() {
        return Ok(additional_info.to_string());
    }

    let system = MERGE_SYSTEM_TEMPLATE.replace("{preserve_instruction}", PRESERVE_FACTS_INSTRUCTION);
    let prompt = MERGE_PROMPT_TEMPLATE
        .replace("{existing_content}", existing_content)
        .replace("{additional_info}", additional_info);

    generator.complete(&system, &prompt).await
}

/// Rewrites a listing into one of the tone presets without changing its facts.
pub async fn transform_tone(
    generator: &dyn TextGenerator,
    content: &str,
    tone: Tone,
) -> Result<String, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let system = TONE_SYSTEM_TEMPLATE
        .replace("{tone_instruction}", tone.instruction())
        .replace("{preserve_instruction}", PRESERVE_FACTS_INSTRUCTION);
    let prompt = TONE_PROMPT_TEMPLATE
        .replace("{tone}", tone.label())
        .replace("{content}", content);

    info!("Rewriting listing in tone {}", tone.label());
    generator.complete(&system, &prompt).await
}

/// Asks the model to propose structured fields for a product. The reply goes
/// through the same edge normalization as form input.
pub async fn suggest_attributes(
    generator: &dyn TextGenerator,
    request: SuggestRequest,
) -> Result<ListingAttributes, AppError> {
    let product_name = non_blank(Some(request.product_name))
        .ok_or_else(|| AppError::Validation("productName is required".to_string()))?;

    let attributes = ListingAttributes {
        brand: non_blank(request.brand),
        ..Default::default()
    };
    let brief = non_blank(request.brief_description);
    let prompt = SUGGEST_PROMPT_TEMPLATE.replace(
        "{product_lines}",
        &product_lines(&product_name, &attributes, brief.as_deref()),
    );

    let value = generator.complete_json(JSON_ONLY_SYSTEM, &prompt).await?;
    let mut suggested: ListingAttributes = serde_json::from_value(value)
        .map_err(|e| AppError::Llm(format!("Suggestion had an unexpected shape: {e}")))?;

    if suggested.product_name.is_none() {
        suggested.product_name = Some(product_name);
    }
    Ok(suggested)
}

/// One "label: value" line per present field, in form order.
fn product_lines(product_name: &str, attrs: &ListingAttributes, brief: Option<&str>) -> String {
    let mut lines = vec![format!("제품명: {product_name}")];

    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    };
    push("브랜드", attrs.brand.clone());
    push(
        "구매 시기",
        attrs.purchase_date.as_deref().map(normalize_purchase_date),
    );
    push(
        "사용 횟수",
        attrs
            .usage_count
            .filter(|&c| c > 0)
            .map(|c| format!("{c}회")),
    );
    push("제품 상태", attrs.condition.clone());
    push("상태 상세", attrs.condition_note.clone());
    push("기본 구성품", joined(&attrs.base_items));
    push("추가 구성품", joined(&attrs.extra_items));
    push("특징/장점", joined(&attrs.features));
    push(
        "구매가",
        attrs.purchase_price.filter(|&p| p > 0).map(format_amount),
    );
    push(
        "판매가",
        attrs.asking_price.filter(|&p| p > 0).map(format_amount),
    );
    push("거래 방식", joined(&attrs.trade_types));
    push("거래 장소", attrs.trade_area.clone());
    push("가격 협의", attrs.negotiation_note.clone());
    push("간단한 설명", brief.map(str::to_string));

    lines.join("\n")
}

fn joined(items: &[String]) -> Option<String> {
    (!items.is_empty()).then(|| items.join(", "))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Generator that answers with canned text and records every prompt.
    pub(crate) struct ScriptedGenerator {
        pub reply: String,
        pub json_reply: Value,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                json_reply: json!({}),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_json(json_reply: Value) -> Self {
            Self {
                json_reply,
                ..Self::new("")
            }
        }

        pub(crate) fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok(self.reply.clone())
        }

        async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok(self.json_reply.clone())
        }
    }

    fn draft_request(value: Value) -> DraftRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_generate_draft_requires_product_name() {
        let generator = ScriptedGenerator::new("초안");
        let result = generate_draft(&generator, draft_request(json!({ "brand": "DJI" }))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generate_draft_pulls_price_marker_out_of_brief() {
        let generator = ScriptedGenerator::new("오즈모 모바일 팝니다!");
        let outcome = generate_draft(
            &generator,
            draft_request(json!({
                "productName": "오즈모 모바일 6",
                "briefDescription": "거의 새것 00십삼만원"
            })),
        )
        .await
        .unwrap();

        assert_eq!(outcome.draft, "오즈모 모바일 팝니다!");
        assert_eq!(outcome.asking_price, Some(130_000));
        assert_eq!(outcome.cleaned_brief.as_deref(), Some("거의 새것"));

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let (system, prompt) = &calls[0];
        assert!(system.contains("존댓말"));
        assert!(prompt.contains("제품명: 오즈모 모바일 6"));
        assert!(prompt.contains("판매가: 130,000원"));
        assert!(prompt.contains("간단한 설명: 거의 새것"));
        assert!(!prompt.contains("00십삼만원"));
    }

    #[tokio::test]
    async fn test_generate_draft_keeps_explicit_asking_price() {
        let generator = ScriptedGenerator::new("초안");
        let outcome = generate_draft(
            &generator,
            draft_request(json!({
                "productName": "아이폰 15",
                "askingPrice": "90만원",
                "briefDescription": "급처 00850000"
            })),
        )
        .await
        .unwrap();
        assert_eq!(outcome.asking_price, Some(900_000));
    }

    #[tokio::test]
    async fn test_generate_draft_lists_only_present_fields() {
        let generator = ScriptedGenerator::new("초안");
        generate_draft(
            &generator,
            draft_request(json!({
                "productName": "에어팟",
                "purchaseDate": "202401",
                "usageCount": 0,
                "tradeTypes": ["택배거래"]
            })),
        )
        .await
        .unwrap();

        let (_, prompt) = &generator.calls()[0];
        assert!(prompt.contains("구매 시기: 24년 1월"));
        assert!(prompt.contains("거래 방식: 택배거래"));
        assert!(!prompt.contains("사용 횟수"));
        assert!(!prompt.contains("브랜드"));
        assert!(!prompt.contains("간단한 설명"));
    }

    #[tokio::test]
    async fn test_merge_with_placeholder_skips_the_model() {
        let generator = ScriptedGenerator::new("병합됨");
        let merged = merge_additional_info(&generator, "기존 초안", NO_INFO_PLACEHOLDER)
            .await
            .unwrap();
        assert_eq!(merged, "기존 초안");
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_merge_without_draft_returns_block() {
        let generator = ScriptedGenerator::new("병합됨");
        let merged = merge_additional_info(&generator, "  ", "✔ 상태: 상\n")
            .await
            .unwrap();
        assert_eq!(merged, "✔ 상태: 상");
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_merge_sends_both_texts() {
        let generator = ScriptedGenerator::new("병합된 판매글");
        let merged = merge_additional_info(&generator, "기존 초안", "✔ 상태: 상\n")
            .await
            .unwrap();
        assert_eq!(merged, "병합된 판매글");

        let (system, prompt) = &generator.calls()[0];
        assert!(system.contains("URL"));
        assert!(prompt.contains("기존 초안"));
        assert!(prompt.contains("✔ 상태: 상"));
    }

    #[test]
    fn test_merge_request_renders_attributes_when_no_text() {
        let request: MergeRequest = serde_json::from_value(json!({
            "existingContent": "초안",
            "attributes": { "tradeTypes": "택배거래" }
        }))
        .unwrap();
        let info = request.resolved_additional_info();
        assert!(info.starts_with("✔ 거래 방식: 택배거래\n"));
    }

    #[test]
    fn test_merge_request_prefers_explicit_text() {
        let request: MergeRequest = serde_json::from_value(json!({
            "existingContent": "초안",
            "additionalInfo": "✔ 직접 입력",
            "attributes": { "condition": "상" }
        }))
        .unwrap();
        assert_eq!(request.resolved_additional_info(), "✔ 직접 입력");
    }

    #[test]
    fn test_merge_request_without_anything_is_placeholder() {
        let request: MergeRequest =
            serde_json::from_value(json!({ "existingContent": "초안" })).unwrap();
        assert_eq!(request.resolved_additional_info(), NO_INFO_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_transform_tone_rejects_empty_content() {
        let generator = ScriptedGenerator::new("변환됨");
        let result = transform_tone(&generator, "   ", Tone::Student).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_transform_tone_prompt_names_tone() {
        let generator = ScriptedGenerator::new("변환됨");
        let out = transform_tone(&generator, "판매합니다 https://example.com", Tone::EssentialsOnly)
            .await
            .unwrap();
        assert_eq!(out, "변환됨");

        let (system, prompt) = &generator.calls()[0];
        assert!(system.contains(Tone::EssentialsOnly.instruction()));
        assert!(system.contains("URL"));
        assert!(prompt.contains("\"용건만\""));
        assert!(prompt.contains("https://example.com"));
    }

    #[tokio::test]
    async fn test_suggest_attributes_normalizes_reply() {
        let generator = ScriptedGenerator::with_json(json!({
            "brand": "DJI",
            "condition": "상",
            "baseItems": ["본체", ""],
            "features": "3축 짐벌\n액티브트랙",
            "purchasePrice": 199000,
            "askingPrice": "13만원",
            "tradeTypes": ["직거래", "택배거래"],
            "tradeArea": ""
        }));
        let suggested = suggest_attributes(
            &generator,
            SuggestRequest {
                product_name: "오즈모 모바일 6".to_string(),
                brand: None,
                brief_description: Some("거의 새것".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(suggested.product_name.as_deref(), Some("오즈모 모바일 6"));
        assert_eq!(suggested.base_items, vec!["본체"]);
        assert_eq!(suggested.features, vec!["3축 짐벌", "액티브트랙"]);
        assert_eq!(suggested.asking_price, Some(130_000));
        assert_eq!(suggested.trade_area, None);

        let (system, prompt) = &generator.calls()[0];
        assert_eq!(system, JSON_ONLY_SYSTEM);
        assert!(prompt.contains("간단한 설명: 거의 새것"));
    }

    #[tokio::test]
    async fn test_suggest_attributes_rejects_malformed_reply() {
        let generator = ScriptedGenerator::with_json(json!({ "baseItems": 42 }));
        let result = suggest_attributes(
            &generator,
            SuggestRequest {
                product_name: "에어팟".to_string(),
                brand: None,
                brief_description: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}

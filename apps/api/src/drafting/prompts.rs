// All LLM prompt constants for the drafting module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for first drafts. Replace `{tone_instruction}`.
pub const DRAFT_SYSTEM_TEMPLATE: &str = "당신은 중고거래 판매글을 작성하는 전문가입니다.
사용자가 제공한 제품 정보를 바탕으로 매력적이고 신뢰할 수 있는 판매글을 작성해주세요.
{tone_instruction}

다음 형식을 따라주세요:
- 제품명과 브랜드를 명시
- 구매 시기와 사용 횟수 언급
- 제품 상태를 구체적으로 설명
- 구성품 목록 (기본 구성품과 추가 구성품 구분)
- 가격 정보 (정가 대비 할인율 언급 가능)
- 거래 방식과 장소
- 가격 협의 가능 여부

판매글은 자연스럽고 읽기 편하게 작성하되, 과장되지 않게 작성해주세요.";

/// First-draft prompt. Replace `{product_lines}` with one "label: value" line per present field.
pub const DRAFT_PROMPT_TEMPLATE: &str = "다음 제품 정보로 판매글을 작성해주세요:

{product_lines}";

/// System prompt for merging the checklist block into a draft.
/// Replace `{preserve_instruction}`.
pub const MERGE_SYSTEM_TEMPLATE: &str = "당신은 중고거래 판매글을 다듬는 편집자입니다.
기존 판매글에 판매자가 입력한 추가 정보를 자연스럽게 반영한 하나의 완성된 판매글을 만들어주세요.
추가 정보가 기존 판매글과 충돌하면 추가 정보를 우선합니다.
체크 표시(✔)로 정리된 항목은 목록 형태를 유지해도 좋습니다.
{preserve_instruction}";

/// Merge prompt. Replace `{existing_content}` and `{additional_info}`.
pub const MERGE_PROMPT_TEMPLATE: &str = "기존 판매글:
{existing_content}

추가 정보:
{additional_info}

위 두 내용을 합친 최종 판매글만 출력해주세요.";

/// System prompt for tone rewrites.
/// Replace `{tone_instruction}` and `{preserve_instruction}`.
pub const TONE_SYSTEM_TEMPLATE: &str = "당신은 중고거래 판매글의 말투를 변환하는 전문가입니다.
원본 판매글의 내용과 정보는 그대로 유지하되, 말투와 표현 방식만 변경해주세요.
{tone_instruction}

{preserve_instruction}";

/// Tone rewrite prompt. Replace `{tone}` and `{content}`.
pub const TONE_PROMPT_TEMPLATE: &str = "다음 판매글을 \"{tone}\" 말투로 변환해주세요:

{content}";

/// Structured field suggestion prompt (JSON mode).
/// Replace `{product_lines}`.
pub const SUGGEST_PROMPT_TEMPLATE: &str = r#"Create a used goods listing draft in Korean based on:
{product_lines}

Return a JSON object with Korean text values and EXACTLY these keys:
{
  "productName": "exact product name",
  "brand": "brand name",
  "condition": "상/중/하 style condition in Korean",
  "conditionNote": "2-3 Korean sentences about condition",
  "baseItems": ["Korean accessory names"],
  "extraItems": ["Korean accessory names"],
  "features": ["one Korean feature per item"],
  "purchasePrice": estimated_original_price_in_won_as_integer,
  "askingPrice": integer_60_to_80_percent_of_purchasePrice,
  "tradeTypes": ["직거래" and/or "택배거래"],
  "tradeArea": "Korean location or empty string",
  "negotiationNote": "negotiation status in Korean"
}

Prices are integers in Korean won. Use an empty string or empty array for anything you cannot infer."#;

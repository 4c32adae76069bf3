// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with a valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Appended to every prompt that rewrites seller text: facts stay as given.
pub const PRESERVE_FACTS_INSTRUCTION: &str = "\
    중요: 원본에 없는 정보(가격, 구성품, 상태, 거래 조건)를 새로 만들어내지 마세요. \
    원본에 포함된 URL은 반드시 그대로 유지해주세요. URL을 변경하거나 삭제하지 마세요.";

/// Default register for listing prose.
pub const DEFAULT_TONE_INSTRUCTION: &str =
    "친근하고 정중한 말투로 작성해주세요. 존댓말을 사용하되 너무 딱딱하지 않게 작성해주세요.";

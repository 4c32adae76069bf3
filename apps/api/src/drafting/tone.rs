//! Tone presets a seller can rewrite a finished listing into.

use serde::{Deserialize, Serialize};

/// Rewrite register. Serialized with the Korean labels the form sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    /// Concise, professional, polite.
    #[serde(rename = "직장인", alias = "office_worker")]
    OfficeWorker,
    /// Friendly and light while staying trustworthy.
    #[serde(rename = "학생", alias = "student")]
    Student,
    /// Summary form, core facts only.
    #[serde(rename = "간단한", alias = "concise")]
    Concise,
    /// Bare essentials, no greetings.
    #[serde(rename = "용건만", alias = "essentials_only")]
    EssentialsOnly,
}

impl Tone {
    /// The label shown to sellers and quoted in the rewrite prompt.
    pub fn label(self) -> &'static str {
        match self {
            Tone::OfficeWorker => "직장인",
            Tone::Student => "학생",
            Tone::Concise => "간단한",
            Tone::EssentialsOnly => "용건만",
        }
    }

    /// Style instruction placed in the system prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            Tone::OfficeWorker => {
                "직장인 말투로 작성해주세요. 간결하고 전문적이며 예의 바른 표현을 사용하되, \
                 너무 딱딱하지 않게 작성해주세요."
            }
            Tone::Student => {
                "학생 말투로 작성해주세요. 친근하고 가벼운 표현을 사용하되, \
                 신뢰를 잃지 않도록 작성해주세요."
            }
            Tone::Concise => {
                "최대한 간단하고 요약된 형식으로 작성해주세요. 핵심 정보만 포함하고 \
                 불필요한 설명은 제거해주세요."
            }
            Tone::EssentialsOnly => {
                "용건만 간단히 전달하는 형식으로 작성해주세요. 최소한의 정보만 포함하고 \
                 인사말이나 부가 설명 없이 작성해주세요."
            }
        }
    }
}

//! Inline price marker — sellers type "00" followed by a price at the end of a
//! quick product blurb ("오즈모 팝니다 00130000", "0085달러", "00십삼만원").
//! This pulls that marker out and parses it.
//!
//! The "00" trigger also fires on phone or serial numbers that start with 00.
//! That collision is accepted; the trigger stays literal.

use std::sync::LazyLock;

use serde::Serialize;

use regex::Regex;

use crate::normalize::korean_price::{parse_price, PriceAmount};

static PRICE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)00([0-9\s,.만천백십억원달러유로엔파운드영일이삼사오육칠팔구]+)").unwrap()
});

/// A description with its price marker removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPrice {
    pub cleaned_description: String,
    /// `None` both when there was no marker and when the marker did not parse.
    pub price: Option<PriceAmount>,
}

/// Finds the first "00<price>" marker, parses the price and removes the whole
/// marker from the description.
pub fn extract_price(description: &str) -> ExtractedPrice {
    let unchanged = || ExtractedPrice {
        cleaned_description: description.to_string(),
        price: None,
    };

    if description.is_empty() {
        return unchanged();
    }

    let Some(caps) = PRICE_MARKER.captures(description) else {
        return unchanged();
    };
    let (Some(full), Some(price_text)) = (caps.get(0), caps.get(1)) else {
        return unchanged();
    };

    let price = parse_price(price_text.as_str().trim());
    let cleaned_description = description.replacen(full.as_str(), "", 1).trim().to_string();

    ExtractedPrice {
        cleaned_description,
        price,
    }
}

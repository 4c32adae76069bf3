//! Listing attributes — the canonical, fully-normalized shape of what a seller
//! entered in the form.
//!
//! The browser form has sent lists as arrays or comma-separated strings, numbers
//! as numbers or strings, and older field names (`originalPrice`,
//! `transactionMethods`, ...). All of that is resolved here, once, while
//! deserializing. Nothing downstream sees a union type.

use serde::{Deserialize, Serialize};

use crate::normalize::korean_price::{float_to_amount, parse_price, PriceAmount};

/// Canonical listing attributes. Every field is optional; `None` / empty means
/// "not entered", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ListingAttributesInput")]
pub struct ListingAttributes {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub purchase_date: Option<String>,
    pub usage_count: Option<u32>,
    pub condition: Option<String>,
    pub condition_note: Option<String>,
    pub base_items: Vec<String>,
    pub extra_items: Vec<String>,
    pub features: Vec<String>,
    pub purchase_price: Option<PriceAmount>,
    pub asking_price: Option<PriceAmount>,
    pub trade_types: Vec<String>,
    pub trade_area: Option<String>,
    pub negotiation_note: Option<String>,
}

impl ListingAttributes {
    /// True when no field carries a value.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// A list field as the form sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl ListInput {
    /// Comma-separated text or an array; items trimmed, empties dropped.
    pub fn into_items(self) -> Vec<String> {
        match self {
            ListInput::Items(items) => clean_items(items),
            ListInput::Text(text) => clean_items(text.split(',').map(str::to_string)),
        }
    }

    /// Newline-separated text or an array; one entry per line.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            ListInput::Items(items) => clean_items(items),
            ListInput::Text(text) => clean_items(text.lines().map(str::to_string)),
        }
    }
}

fn clean_items(items: impl IntoIterator<Item = String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// A numeric field as the form sends it: a JSON number or typed text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl NumberInput {
    /// Prices: text goes through the Korean price parser ("50만원").
    pub fn into_price(self) -> Option<PriceAmount> {
        match self {
            NumberInput::Integer(n) => Some(n),
            NumberInput::Float(f) => float_to_amount(f),
            NumberInput::Text(text) => parse_price(&text),
        }
    }

    /// Counts: plain non-negative integers only.
    pub fn into_count(self) -> Option<u32> {
        match self {
            NumberInput::Integer(n) => u32::try_from(n).ok(),
            NumberInput::Float(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => {
                Some(f as u32)
            }
            NumberInput::Float(_) => None,
            NumberInput::Text(text) => text.trim().replace(',', "").parse().ok(),
        }
    }
}

/// Wire form of `ListingAttributes`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingAttributesInput {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub purchase_date: Option<String>,
    pub usage_count: Option<NumberInput>,
    pub condition: Option<String>,
    pub condition_note: Option<String>,
    #[serde(alias = "basicAccessories")]
    pub base_items: Option<ListInput>,
    #[serde(alias = "otherAccessories")]
    pub extra_items: Option<ListInput>,
    pub features: Option<ListInput>,
    #[serde(alias = "originalPrice")]
    pub purchase_price: Option<NumberInput>,
    #[serde(alias = "sellingPrice")]
    pub asking_price: Option<NumberInput>,
    #[serde(alias = "transactionMethods")]
    pub trade_types: Option<ListInput>,
    #[serde(alias = "directLocation")]
    pub trade_area: Option<String>,
    #[serde(alias = "nego", alias = "negotiable")]
    pub negotiation_note: Option<String>,
}

impl From<ListingAttributesInput> for ListingAttributes {
    fn from(input: ListingAttributesInput) -> Self {
        ListingAttributes {
            product_name: non_blank(input.product_name),
            brand: non_blank(input.brand),
            purchase_date: non_blank(input.purchase_date),
            usage_count: input.usage_count.and_then(NumberInput::into_count),
            condition: non_blank(input.condition),
            condition_note: non_blank(input.condition_note),
            base_items: input.base_items.map(ListInput::into_items).unwrap_or_default(),
            extra_items: input.extra_items.map(ListInput::into_items).unwrap_or_default(),
            features: input.features.map(ListInput::into_lines).unwrap_or_default(),
            purchase_price: input.purchase_price.and_then(NumberInput::into_price),
            asking_price: input.asking_price.and_then(NumberInput::into_price),
            trade_types: input.trade_types.map(ListInput::into_items).unwrap_or_default(),
            trade_area: non_blank(input.trade_area),
            negotiation_note: non_blank(input.negotiation_note),
        }
    }
}

/// Trims; empty or whitespace-only text counts as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::normalize::attributes::{non_blank, ListingAttributes};

/// A saved listing (`resell_posts`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub brand: Option<String>,
    pub purchase_date: Option<String>,
    pub usage_count: Option<i32>,
    pub condition: Option<String>,
    pub condition_note: Option<String>,
    pub base_items: Option<Vec<String>>,
    pub extra_items: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub purchase_price: Option<i64>,
    pub asking_price: Option<i64>,
    pub trade_types: Option<Vec<String>>,
    pub trade_area: Option<String>,
    #[sqlx(rename = "nego")]
    #[serde(rename = "nego", alias = "negotiationNote")]
    pub negotiation_note: Option<String>,
    pub ai_draft: Option<String>,
    pub pending_draft: Option<String>,
    pub final_draft: Option<String>,
    pub fields: Option<Value>,
}

/// Body of a create or a partial update: the structured fields, the three
/// draft stages, and free-form form state. `None` / empty means "not sent".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingChanges {
    #[serde(flatten)]
    pub attributes: ListingAttributes,
    #[serde(default)]
    pub ai_draft: Option<String>,
    #[serde(default)]
    pub pending_draft: Option<String>,
    #[serde(default)]
    pub final_draft: Option<String>,
    #[serde(default)]
    pub fields: Option<Value>,
}

/// `ListingChanges` converted to column types. `None` = leave the column alone.
#[derive(Debug, Clone, Default)]
pub struct ListingColumns {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub purchase_date: Option<String>,
    pub usage_count: Option<i32>,
    pub condition: Option<String>,
    pub condition_note: Option<String>,
    pub base_items: Option<Vec<String>>,
    pub extra_items: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub purchase_price: Option<i64>,
    pub asking_price: Option<i64>,
    pub trade_types: Option<Vec<String>>,
    pub trade_area: Option<String>,
    pub negotiation_note: Option<String>,
    pub ai_draft: Option<String>,
    pub pending_draft: Option<String>,
    pub final_draft: Option<String>,
    pub fields: Option<Value>,
}

impl TryFrom<ListingChanges> for ListingColumns {
    type Error = AppError;

    fn try_from(changes: ListingChanges) -> Result<Self, AppError> {
        let attrs = changes.attributes;
        Ok(ListingColumns {
            product_name: attrs.product_name,
            brand: attrs.brand,
            purchase_date: attrs.purchase_date,
            usage_count: attrs
                .usage_count
                .map(i32::try_from)
                .transpose()
                .map_err(|_| AppError::Validation("usageCount is too large".to_string()))?,
            condition: attrs.condition,
            condition_note: attrs.condition_note,
            base_items: non_empty(attrs.base_items),
            extra_items: non_empty(attrs.extra_items),
            features: non_empty(attrs.features),
            purchase_price: price_column(attrs.purchase_price, "purchasePrice")?,
            asking_price: price_column(attrs.asking_price, "askingPrice")?,
            trade_types: non_empty(attrs.trade_types),
            trade_area: attrs.trade_area,
            negotiation_note: attrs.negotiation_note,
            ai_draft: non_blank(changes.ai_draft),
            pending_draft: non_blank(changes.pending_draft),
            final_draft: non_blank(changes.final_draft),
            fields: changes.fields.filter(|v| !v.is_null()),
        })
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

fn price_column(price: Option<u64>, field: &str) -> Result<Option<i64>, AppError> {
    price
        .map(i64::try_from)
        .transpose()
        .map_err(|_| AppError::Validation(format!("{field} is too large")))
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl ListingRow {
    /// Builds a brand-new row. The product name is the only required field.
    pub fn new(columns: ListingColumns) -> Result<Self, AppError> {
        let product_name = columns
            .product_name
            .clone()
            .ok_or_else(|| AppError::Validation("productName is required".to_string()))?;

        let mut row = ListingRow {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            product_name,
            brand: None,
            purchase_date: None,
            usage_count: None,
            condition: None,
            condition_note: None,
            base_items: None,
            extra_items: None,
            features: None,
            purchase_price: None,
            asking_price: None,
            trade_types: None,
            trade_area: None,
            negotiation_note: None,
            ai_draft: None,
            pending_draft: None,
            final_draft: None,
            fields: None,
        };
        row.apply(columns);
        Ok(row)
    }

    /// Partial update: only provided columns change.
    pub fn apply(&mut self, columns: ListingColumns) {
        if let Some(name) = columns.product_name {
            self.product_name = name;
        }
        overwrite(&mut self.brand, columns.brand);
        overwrite(&mut self.purchase_date, columns.purchase_date);
        overwrite(&mut self.usage_count, columns.usage_count);
        overwrite(&mut self.condition, columns.condition);
        overwrite(&mut self.condition_note, columns.condition_note);
        overwrite(&mut self.base_items, columns.base_items);
        overwrite(&mut self.extra_items, columns.extra_items);
        overwrite(&mut self.features, columns.features);
        overwrite(&mut self.purchase_price, columns.purchase_price);
        overwrite(&mut self.asking_price, columns.asking_price);
        overwrite(&mut self.trade_types, columns.trade_types);
        overwrite(&mut self.trade_area, columns.trade_area);
        overwrite(&mut self.negotiation_note, columns.negotiation_note);
        overwrite(&mut self.ai_draft, columns.ai_draft);
        overwrite(&mut self.pending_draft, columns.pending_draft);
        overwrite(&mut self.final_draft, columns.final_draft);
        overwrite(&mut self.fields, columns.fields);
    }

    /// The stored structured fields, back in canonical form.
    pub fn attributes(&self) -> ListingAttributes {
        ListingAttributes {
            product_name: Some(self.product_name.clone()),
            brand: self.brand.clone(),
            purchase_date: self.purchase_date.clone(),
            usage_count: self.usage_count.and_then(|c| u32::try_from(c).ok()),
            condition: self.condition.clone(),
            condition_note: self.condition_note.clone(),
            base_items: self.base_items.clone().unwrap_or_default(),
            extra_items: self.extra_items.clone().unwrap_or_default(),
            features: self.features.clone().unwrap_or_default(),
            purchase_price: self.purchase_price.and_then(|p| u64::try_from(p).ok()),
            asking_price: self.asking_price.and_then(|p| u64::try_from(p).ok()),
            trade_types: self.trade_types.clone().unwrap_or_default(),
            trade_area: self.trade_area.clone(),
            negotiation_note: self.negotiation_note.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(value: Value) -> ListingColumns {
        let changes: ListingChanges = serde_json::from_value(value).unwrap();
        ListingColumns::try_from(changes).unwrap()
    }

    #[test]
    fn test_new_row_requires_product_name() {
        let result = ListingRow::new(columns(json!({ "brand": "DJI" })));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_row_takes_normalized_form_input() {
        let row = ListingRow::new(columns(json!({
            "productName": "오즈모 모바일 6",
            "askingPrice": "13만원",
            "baseItems": "본체, 케이블",
            "negotiationNote": "네고 불가",
            "aiDraft": "초안",
            "fields": { "deliveryFee": "3000" }
        })))
        .unwrap();

        assert_eq!(row.product_name, "오즈모 모바일 6");
        assert_eq!(row.asking_price, Some(130_000));
        assert_eq!(
            row.base_items,
            Some(vec!["본체".to_string(), "케이블".to_string()])
        );
        assert_eq!(row.negotiation_note.as_deref(), Some("네고 불가"));
        assert_eq!(row.ai_draft.as_deref(), Some("초안"));
        assert_eq!(row.fields, Some(json!({ "deliveryFee": "3000" })));
        assert_eq!(row.extra_items, None);
    }

    #[test]
    fn test_apply_keeps_unsent_columns() {
        let mut row = ListingRow::new(columns(json!({
            "productName": "에어팟",
            "condition": "상",
            "tradeTypes": ["직거래"]
        })))
        .unwrap();

        row.apply(columns(json!({ "finalDraft": "최종본", "tradeTypes": ["택배거래"] })));

        assert_eq!(row.product_name, "에어팟");
        assert_eq!(row.condition.as_deref(), Some("상"));
        assert_eq!(row.trade_types, Some(vec!["택배거래".to_string()]));
        assert_eq!(row.final_draft.as_deref(), Some("최종본"));
    }

    #[test]
    fn test_attributes_round_trip_through_row() {
        let row = ListingRow::new(columns(json!({
            "productName": "아이폰 15",
            "usageCount": 120,
            "purchasePrice": 1250000,
            "features": ["배터리 효율 91%"]
        })))
        .unwrap();

        let attrs = row.attributes();
        assert_eq!(attrs.product_name.as_deref(), Some("아이폰 15"));
        assert_eq!(attrs.usage_count, Some(120));
        assert_eq!(attrs.purchase_price, Some(1_250_000));
        assert_eq!(attrs.features, vec!["배터리 효율 91%"]);
        assert!(attrs.trade_types.is_empty());
    }

    #[test]
    fn test_oversized_price_is_rejected() {
        let changes: ListingChanges = serde_json::from_value(json!({
            "productName": "x",
            "askingPrice": u64::MAX
        }))
        .unwrap();
        assert!(matches!(
            ListingColumns::try_from(changes),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_row_serializes_camel_case() {
        let row = ListingRow::new(columns(json!({ "productName": "x", "negotiationNote": "가능" }))).unwrap();
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["productName"], "x");
        assert_eq!(value["nego"], "가능");
        assert!(value.get("negotiationNote").is_none());
        assert!(value.get("createdAt").is_some());
    }
}

//! Checklist block rendered from the structured form fields, merged into the
//! AI-drafted prose before a listing is saved.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::attributes::ListingAttributes;
use crate::normalize::korean_price::format_price;

/// Returned when no field produced a line. Callers compare against it to detect
/// "nothing entered yet".
pub const NO_INFO_PLACEHOLDER: &str = "입력한 추가 정보가 여기에 실시간으로 반영됩니다";

/// Appended under the trade line when courier delivery is the only option.
pub const SHIPPING_ONLY_CAVEAT: &str =
    "(직거래 약속등을 잡을 시간이 없어 택배거래만 가능한점을 양해 부탁드립니다)";

const SHIPPING_ONLY: &str = "택배거래";

/// Renders the checklist. Section order is fixed; absent, empty and zero
/// fields are skipped.
pub fn format_additional_info(attrs: &ListingAttributes) -> String {
    let mut info = String::new();

    if let Some(date) = &attrs.purchase_date {
        check_line(&mut info, &format!("최초 구매일: {}", normalize_purchase_date(date)));
    }
    if let Some(count) = attrs.usage_count.filter(|&c| c > 0) {
        check_line(&mut info, &format!("배터리 사용횟수: {count}"));
    }
    if let Some(condition) = &attrs.condition {
        check_line(&mut info, &format!("상태: {condition}"));
    }
    if let Some(note) = &attrs.condition_note {
        check_line(&mut info, &format!("상태 설명: {note}"));
    }
    if !attrs.base_items.is_empty() {
        check_line(&mut info, &format!("기본 구성품: {}", attrs.base_items.join(", ")));
    }
    if !attrs.extra_items.is_empty() {
        check_line(&mut info, &format!("별도 구성품: {}", attrs.extra_items.join(", ")));
    }
    if !attrs.features.is_empty() {
        check_line(&mut info, "제품 특징:");
        for feature in &attrs.features {
            push_line(&mut info, feature);
        }
    }
    if let Some(price) = attrs.purchase_price.filter(|&p| p > 0) {
        check_line(&mut info, &format!("초기 구매가: {}", format_price(&price.to_string())));
    }
    if let Some(price) = attrs.asking_price.filter(|&p| p > 0) {
        check_line(&mut info, &format!("판매 희망가: {}", format_price(&price.to_string())));
    }
    if !attrs.trade_types.is_empty() {
        check_line(&mut info, &format!("거래 방식: {}", attrs.trade_types.join(", ")));
        if attrs.trade_types.len() == 1 && attrs.trade_types[0] == SHIPPING_ONLY {
            push_line(&mut info, SHIPPING_ONLY_CAVEAT);
        }
    }
    if let Some(area) = &attrs.trade_area {
        check_line(&mut info, &format!("직거래 장소: {area}"));
    }
    if let Some(note) = &attrs.negotiation_note {
        check_line(&mut info, note);
    }

    if info.is_empty() {
        NO_INFO_PLACEHOLDER.to_string()
    } else {
        info
    }
}

fn check_line(info: &mut String, text: &str) {
    info.push_str("✔ ");
    push_line(info, text);
}

fn push_line(info: &mut String, text: &str) {
    info.push_str(text);
    info.push('\n');
}

/// `YYYYMM` or `YYYY-MM`.
static PURCHASE_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}([0-9]{2})-?([0-9]{2})$").unwrap());

/// "202505" or "2025-05" → "25년 5월". Anything else is returned as typed.
pub fn normalize_purchase_date(date: &str) -> String {
    let Some(caps) = PURCHASE_MONTH.captures(date) else {
        return date.to_string();
    };
    match caps[2].parse::<u32>() {
        Ok(month) => format!("{}년 {}월", &caps[1], month),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> ListingAttributes {
        ListingAttributes::default()
    }

    #[test]
    fn test_no_fields_renders_placeholder() {
        assert_eq!(format_additional_info(&attrs()), NO_INFO_PLACEHOLDER);
    }

    #[test]
    fn test_zero_numbers_count_as_absent() {
        let a = ListingAttributes {
            usage_count: Some(0),
            purchase_price: Some(0),
            asking_price: Some(0),
            ..attrs()
        };
        assert_eq!(format_additional_info(&a), NO_INFO_PLACEHOLDER);
    }

    #[test]
    fn test_purchase_date_is_normalized() {
        let a = ListingAttributes {
            purchase_date: Some("202505".to_string()),
            ..attrs()
        };
        assert_eq!(format_additional_info(&a), "✔ 최초 구매일: 25년 5월\n");
    }

    #[test]
    fn test_normalize_purchase_date_forms() {
        assert_eq!(normalize_purchase_date("202505"), "25년 5월");
        assert_eq!(normalize_purchase_date("2024-11"), "24년 11월");
        assert_eq!(normalize_purchase_date("2025-05"), "25년 5월");
        assert_eq!(normalize_purchase_date("2025-005"), "2025-005");
        assert_eq!(normalize_purchase_date("２０２５０５"), "２０２５０５");
        assert_eq!(normalize_purchase_date("작년 여름"), "작년 여름");
        assert_eq!(normalize_purchase_date("2025"), "2025");
        assert_eq!(normalize_purchase_date("2025-5"), "2025-5");
        assert_eq!(normalize_purchase_date("20250a"), "20250a");
        // 6 bytes, but not 6 ASCII digits
        assert_eq!(normalize_purchase_date("작년"), "작년");
    }

    #[test]
    fn test_shipping_only_appends_caveat() {
        let a = ListingAttributes {
            trade_types: vec!["택배거래".to_string()],
            ..attrs()
        };
        let expected = format!("✔ 거래 방식: 택배거래\n{SHIPPING_ONLY_CAVEAT}\n");
        assert_eq!(format_additional_info(&a), expected);
    }

    #[test]
    fn test_shipping_among_others_has_no_caveat() {
        let a = ListingAttributes {
            trade_types: vec!["직거래".to_string(), "택배거래".to_string()],
            ..attrs()
        };
        let out = format_additional_info(&a);
        assert_eq!(out, "✔ 거래 방식: 직거래, 택배거래\n");
        assert!(!out.contains(SHIPPING_ONLY_CAVEAT));
    }

    #[test]
    fn test_full_listing_in_fixed_order() {
        let a = ListingAttributes {
            product_name: Some("오즈모 모바일 6".to_string()),
            brand: Some("DJI".to_string()),
            purchase_date: Some("2024-03".to_string()),
            usage_count: Some(12),
            condition: Some("상".to_string()),
            condition_note: Some("생활기스 약간".to_string()),
            base_items: vec!["본체".to_string(), "케이블".to_string()],
            extra_items: vec!["삼각대".to_string()],
            features: vec!["3축 짐벌".to_string(), "액티브트랙".to_string()],
            purchase_price: Some(199_000),
            asking_price: Some(130_000),
            trade_types: vec!["직거래".to_string()],
            trade_area: Some("작전역".to_string()),
            negotiation_note: Some("네고 불가".to_string()),
        };

        let expected = "\
✔ 최초 구매일: 24년 3월
✔ 배터리 사용횟수: 12
✔ 상태: 상
✔ 상태 설명: 생활기스 약간
✔ 기본 구성품: 본체, 케이블
✔ 별도 구성품: 삼각대
✔ 제품 특징:
3축 짐벌
액티브트랙
✔ 초기 구매가: 199,000원
✔ 판매 희망가: 130,000원
✔ 거래 방식: 직거래
✔ 직거래 장소: 작전역
✔ 네고 불가
";
        assert_eq!(format_additional_info(&a), expected);
    }

    #[test]
    fn test_product_name_and_brand_are_not_rendered() {
        let a = ListingAttributes {
            product_name: Some("아이폰".to_string()),
            brand: Some("Apple".to_string()),
            ..attrs()
        };
        assert_eq!(format_additional_info(&a), NO_INFO_PLACEHOLDER);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let a = ListingAttributes {
            condition: Some("중".to_string()),
            trade_types: vec!["택배거래".to_string()],
            asking_price: Some(5_000),
            ..attrs()
        };
        assert_eq!(format_additional_info(&a), format_additional_info(&a));
    }

    #[test]
    fn test_unusable_numbers_from_form_are_not_rendered() {
        let a: ListingAttributes = serde_json::from_value(serde_json::json!({
            "tradeTypes": "택배거래, ",
            "usageCount": 1.5,
            "purchasePrice": 1e30
        }))
        .unwrap();
        assert_eq!(
            format_additional_info(&a),
            format!("✔ 거래 방식: 택배거래\n{SHIPPING_ONLY_CAVEAT}\n")
        );
    }
}

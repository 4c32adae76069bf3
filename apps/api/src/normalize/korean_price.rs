//! Korean price parser — turns what a seller types into a price field
//! ("50만원", "3천5백원", "오천원", "100,000원 (약 $70)", "약 $70") into a won amount.
//!
//! Failure is `None`, never an error. Callers show the raw input instead
//! (see `format_price`).

use std::sync::LazyLock;

use regex::Regex;

/// Integer count of won. Never fractional.
pub type PriceAmount = u64;

/// USD → KRW rate applied when the caller does not supply one.
pub const DEFAULT_USD_KRW_RATE: f64 = 1450.0;

/// Magnitude units, largest first. The mixed-digit parser walks them in this order.
const MAGNITUDES: [(char, u64); 5] = [
    ('억', 100_000_000),
    ('만', 10_000),
    ('천', 1_000),
    ('백', 100),
    ('십', 10),
];

/// Dollar patterns in priority order; the first one that matches wins.
static USD_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // "$70", "$ 약 70", "약 $1,200.50"
        Regex::new(r"\$\s*(?:약\s*)?(\d[\d,]*(?:\.\d+)?)").unwrap(),
        // "70달러", "약 70 USD", "70 dollars"
        Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:달러|usd|dollars?)").unwrap(),
        // "USD 70"
        Regex::new(r"(?i)usd\s*(\d[\d,]*(?:\.\d+)?)").unwrap(),
    ]
});

/// Parses a price with the default exchange rate for dollar amounts.
pub fn parse_price(input: &str) -> Option<PriceAmount> {
    parse_price_with_rate(input, DEFAULT_USD_KRW_RATE)
}

/// Parses a human-typed price into won.
///
/// Order of interpretation:
/// 1. plain digits with optional thousands separators
/// 2. the bare words "만원" / "천원"
/// 3. a `원` amount outside any parentheses wins over a dollar annotation
/// 4. dollar amounts, converted with `exchange_rate` and rounded
/// 5. Arabic digits mixed with Hangul units ("3천5백원")
/// 6. Hangul numerals ("오천원")
pub fn parse_price_with_rate(input: &str, exchange_rate: f64) -> Option<PriceAmount> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(amount) = parse_plain_digits(trimmed) {
        return Some(amount);
    }

    if let Some(amount) = bare_unit_word(trimmed) {
        return Some(amount);
    }

    let masked = mask_parentheses(trimmed);
    if let Some(pos) = masked.find('원') {
        return parse_won_text(&masked[..pos + '원'.len_utf8()]);
    }

    if let Some(dollars) = find_dollar_amount(trimmed) {
        return convert_usd(dollars, exchange_rate);
    }

    parse_won_text(trimmed)
}

/// Renders a parsed price as "130,000원", or hands back the input untouched.
pub fn format_price(input: &str) -> String {
    match parse_price(input) {
        Some(amount) => format_amount(amount),
        None => input.to_string(),
    }
}

/// Renders an already-parsed amount as "130,000원".
pub fn format_amount(amount: PriceAmount) -> String {
    format!("{}원", group_thousands(amount))
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn parse_plain_digits(text: &str) -> Option<u64> {
    let stripped = text.replace(',', "");
    if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    stripped.parse().ok()
}

fn bare_unit_word(text: &str) -> Option<u64> {
    match text {
        "만원" => Some(10_000),
        "천원" => Some(1_000),
        _ => None,
    }
}

/// Blanks out every parenthesised segment so "(약 $70)" annotations
/// cannot contribute a `원` or a dollar sign.
fn mask_parentheses(text: &str) -> String {
    let mut depth = 0usize;
    text.chars()
        .map(|c| match c {
            '(' | '（' => {
                depth += 1;
                ' '
            }
            ')' | '）' => {
                depth = depth.saturating_sub(1);
                ' '
            }
            _ if depth > 0 => ' ',
            _ => c,
        })
        .collect()
}

/// Won-denominated text: digits, bare unit words, mixed or Hangul numerals.
fn parse_won_text(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(amount) = parse_plain_digits(text) {
        return Some(amount);
    }
    if let Some(amount) = bare_unit_word(text) {
        return Some(amount);
    }

    let text = text.strip_suffix('원').unwrap_or(text);
    if text.chars().any(|c| c.is_ascii_digit()) {
        parse_mixed(text)
    } else {
        parse_hangul(text)
    }
}

fn find_dollar_amount(text: &str) -> Option<f64> {
    USD_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
    })
}

fn convert_usd(dollars: f64, exchange_rate: f64) -> Option<u64> {
    float_to_amount(dollars * exchange_rate)
}

/// Rounds to whole won; negative, non-finite and out-of-range values are `None`.
pub(crate) fn float_to_amount(value: f64) -> Option<u64> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded >= u64::MAX as f64 {
        return None;
    }
    Some(rounded as u64)
}

/// "50만", "3천5백", "1억2천만": split at each unit from largest to smallest,
/// multiply what sits to its left, carry the remainder to the next unit.
fn parse_mixed(text: &str) -> Option<u64> {
    let mut rest = text;
    let mut total: u64 = 0;

    for (unit_char, unit) in MAGNITUDES {
        if let Some((left, right)) = rest.split_once(unit_char) {
            total = total.checked_add(scaled_left(left, unit)?)?;
            rest = right;
        }
    }

    let tail: String = rest.chars().filter(char::is_ascii_digit).collect();
    if !tail.is_empty() {
        total = total.checked_add(tail.parse().ok()?)?;
    }

    (total > 0).then_some(total)
}

/// Value of the text left of a unit, already multiplied by that unit.
/// An empty left side counts as one ("만" in "만5천").
fn scaled_left(left: &str, unit: u64) -> Option<u64> {
    // "3천만": the multiplier of a large unit can carry its own small units.
    if unit >= 10_000 && left.contains(&['천', '백', '십'][..]) {
        return parse_mixed(left)?.checked_mul(unit);
    }

    let numeric: String = left
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if numeric.chars().all(|c| c == '.') {
        return Some(unit);
    }
    if numeric.contains('.') {
        // "1.5만"
        let value: f64 = numeric.parse().ok()?;
        return float_to_amount(value * unit as f64);
    }
    numeric.parse::<u64>().ok()?.checked_mul(unit)
}

fn hangul_digit(c: char) -> Option<u64> {
    let value = match c {
        '영' => 0,
        '일' => 1,
        '이' => 2,
        '삼' => 3,
        '사' => 4,
        '오' => 5,
        '육' => 6,
        '칠' => 7,
        '팔' => 8,
        '구' => 9,
        _ => return None,
    };
    Some(value)
}

/// "오천", "십삼만", "일억이천삼백만". Small units (십/백/천) build a sub-total;
/// large units (만/억) scale the whole sub-total into the grand total.
fn parse_hangul(text: &str) -> Option<u64> {
    let mut total: u64 = 0;
    let mut section: u64 = 0;
    let mut digit: Option<u64> = None;

    for c in text.chars() {
        if let Some(d) = hangul_digit(c) {
            digit = Some(d);
            continue;
        }
        match c {
            '십' | '백' | '천' => {
                let unit = small_unit(c);
                let term = digit.take().unwrap_or(1).checked_mul(unit)?;
                section = section.checked_add(term)?;
            }
            '만' | '억' => {
                let unit = if c == '만' { 10_000 } else { 100_000_000 };
                section = section.checked_add(digit.take().unwrap_or(0))?;
                if section == 0 {
                    section = 1;
                }
                total = total.checked_add(section.checked_mul(unit)?)?;
                section = 0;
            }
            _ => {}
        }
    }

    total = total
        .checked_add(section)?
        .checked_add(digit.unwrap_or(0))?;

    (total > 0).then_some(total)
}

fn small_unit(c: char) -> u64 {
    match c {
        '십' => 10,
        '백' => 100,
        _ => 1_000,
    }
}

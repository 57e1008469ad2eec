// src/extractors/normalize.rs
//! Text and unit normalizers applied to matched field text.
//!
//! Each normalizer returns `None` when the text holds nothing it recognizes;
//! the extractor turns that into the field's fallback.

// --- Imports ---
use crate::extractors::fields::FieldValue;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([0-9,]+\.?\d*)").expect("Failed to compile CURRENCY_RE")
});

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+").expect("Failed to compile DIGITS_RE")
});

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9.]+").expect("Failed to compile DECIMAL_RE")
});

static SKU_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^SKU:\s*").expect("Failed to compile SKU_PREFIX_RE")
});

static DIMENSION_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*x\s*").expect("Failed to compile DIMENSION_SEPARATOR_RE")
});

// Weight patterns, tried in this order. Input is lowercased first.
static POUNDS_OUNCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:lb|lbs|pounds?)\s*(\d+(?:\.\d+)?)\s*(?:oz|ounces?)?")
        .expect("Failed to compile POUNDS_OUNCES_RE")
});
static POUNDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:lb|lbs|pounds?)").expect("Failed to compile POUNDS_RE")
});
static OUNCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:oz|ounces?)").expect("Failed to compile OUNCES_RE")
});
static BARE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)").expect("Failed to compile BARE_NUMBER_RE")
});

// Name extraction patterns
static LEADING_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[A-Z0-9]+\s*").expect("Failed to compile LEADING_CODE_RE")
});
static NAME_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| {
    // long numeric runs (street numbers, phones), email marker, "IL 62701"
    Regex::new(r"\d{3,}|@|[A-Z]{2}\s+\d{5}").expect("Failed to compile NAME_BOUNDARY_RE")
});
static TRAILING_DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+.*$").expect("Failed to compile TRAILING_DIGITS_RE")
});
static ALPHA_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]+$").expect("Failed to compile ALPHA_WORD_RE")
});

/// Bare numbers above this are read as pounds, anything else as ounces.
/// A guessed convention; values close to it can be misclassified.
const BARE_WEIGHT_POUNDS_THRESHOLD: f64 = 10.0;
const OUNCES_PER_POUND: f64 = 16.0;

// --- Scalar Normalizers ---

/// Trimmed text, absent when blank.
pub fn text(raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| FieldValue::Text(trimmed.to_string()))
}

/// `"Total: $1,234.56"` -> `"1234.56"`.
pub fn currency(raw: &str) -> Option<FieldValue> {
    let caps = CURRENCY_RE.captures(raw)?;
    let amount = caps.get(1)?.as_str().replace(',', "");
    Some(FieldValue::Text(amount))
}

/// First run of digits, e.g. a quantity.
pub fn integer(raw: &str) -> Option<FieldValue> {
    DIGITS_RE
        .find(raw)
        .map(|m| FieldValue::Text(m.as_str().to_string()))
}

/// First run of digits and dots, e.g. a rate-card cost.
pub fn decimal(raw: &str) -> Option<FieldValue> {
    DECIMAL_RE
        .find(raw)
        .map(|m| FieldValue::Text(m.as_str().to_string()))
}

pub fn sku(raw: &str) -> Option<FieldValue> {
    text(&SKU_PREFIX_RE.replace(raw.trim(), ""))
}

/// `"16 x 13 x 5"` -> `"16x13x5"`. Numbers are neither validated nor reordered.
pub fn dimensions(raw: &str) -> Option<FieldValue> {
    let joined = DIMENSION_SEPARATOR_RE.replace_all(raw.trim(), "x");
    text(&joined)
}

/// Weight label to pounds, rounded to two decimals.
pub fn weight(raw: &str) -> Option<FieldValue> {
    parse_weight_pounds(raw).map(FieldValue::Number)
}

pub fn parse_weight_pounds(raw: &str) -> Option<f64> {
    let text = raw.trim().to_lowercase();
    let number = |caps: &regex::Captures, group: usize| -> f64 {
        caps.get(group)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    let pounds = if let Some(caps) = POUNDS_OUNCES_RE.captures(&text) {
        number(&caps, 1) + number(&caps, 2) / OUNCES_PER_POUND
    } else if let Some(caps) = POUNDS_RE.captures(&text) {
        number(&caps, 1)
    } else if let Some(caps) = OUNCES_RE.captures(&text) {
        number(&caps, 1) / OUNCES_PER_POUND
    } else if let Some(caps) = BARE_NUMBER_RE.captures(&text) {
        let value = number(&caps, 1);
        if value > BARE_WEIGHT_POUNDS_THRESHOLD {
            value
        } else {
            tracing::trace!("Unitless weight {} read as ounces", value);
            value / OUNCES_PER_POUND
        }
    } else {
        return None;
    };

    (pounds > 0.0).then(|| (pounds * 100.0).round() / 100.0)
}

/// Allow-list of carriers; anything else is unresolved even when text is present.
pub fn carrier(raw: &str) -> Option<FieldValue> {
    let normalized = raw.trim().to_lowercase();
    let label = if normalized.contains("usps") || normalized.contains("united states postal") {
        "USPS"
    } else if normalized.contains("fedex") || normalized.contains("fed ex") {
        "FedEx"
    } else {
        tracing::debug!("Carrier '{}' is not in the allow-list", raw.trim());
        return None;
    };
    Some(FieldValue::Text(label.to_string()))
}

// --- Name Extraction ---

/// One way of pulling a person's name out of an address/label block.
pub type NameStrategy = fn(&str) -> Option<String>;

/// Tried in order; the first strategy that yields a name wins.
pub const NAME_STRATEGIES: &[NameStrategy] = &[
    name_before_address,
    first_alphabetic_words,
    first_raw_words,
];

/// Name from a mixed block such as `"#ICC40235 Jane Smith 123 Main St ..."`.
pub fn recipient_name(raw: &str) -> Option<FieldValue> {
    extract_name(raw, NAME_STRATEGIES).map(FieldValue::Text)
}

pub fn extract_name(raw: &str, strategies: &[NameStrategy]) -> Option<String> {
    let text = raw.trim();
    strategies.iter().find_map(|strategy| strategy(text))
}

/// Drops a leading `#CODE`, cuts at the first address-like boundary and keeps
/// what precedes it if it has a plausible length.
fn name_before_address(text: &str) -> Option<String> {
    let without_code = LEADING_CODE_RE.replace(text, "");
    let head = NAME_BOUNDARY_RE
        .split(&without_code)
        .next()
        .unwrap_or_default()
        .trim();
    let name = TRAILING_DIGITS_RE.replace(head, "");
    let name = name.trim();

    let length = name.chars().count();
    (length > 2 && length < 50).then(|| name.to_string())
}

/// First two purely alphabetic words longer than one letter.
fn first_alphabetic_words(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|word| word.len() > 1 && ALPHA_WORD_RE.is_match(word))
        .take(2)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn first_raw_words(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().take(2).collect();
    (!words.is_empty()).then(|| words.join(" "))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: Option<FieldValue>) -> f64 {
        match value {
            Some(FieldValue::Number(n)) => n,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    fn text_of(value: Option<FieldValue>) -> Option<String> {
        match value {
            Some(FieldValue::Text(t)) => Some(t),
            Some(other) => panic!("expected text, got {:?}", other),
            None => None,
        }
    }

    #[test]
    fn test_weight_units() {
        assert_eq!(number(weight("5 lb 8 oz")), 5.5);
        assert_eq!(number(weight("5lbs 8oz")), 5.5);
        assert_eq!(number(weight("24 oz")), 1.5);
        assert_eq!(number(weight("5.5 lb")), 5.5);
        assert_eq!(number(weight("2 Pounds")), 2.0);
        assert_eq!(number(weight("  3 LB 4  ")), 3.25);
    }

    #[test]
    fn test_weight_bare_number_threshold() {
        assert_eq!(number(weight("7")), 0.44);
        assert_eq!(number(weight("10")), 0.63);
        assert_eq!(number(weight("12")), 12.0);
    }

    #[test]
    fn test_weight_unparseable_or_zero() {
        assert_eq!(weight("heavy"), None);
        assert_eq!(weight(""), None);
        assert_eq!(weight("0 lb"), None);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(text_of(dimensions("16 x 13 x 5")).as_deref(), Some("16x13x5"));
        assert_eq!(text_of(dimensions("16X13X5")).as_deref(), Some("16x13x5"));
        assert_eq!(text_of(dimensions("  8.5 x 11 ")).as_deref(), Some("8.5x11"));
    }

    #[test]
    fn test_currency() {
        assert_eq!(text_of(currency("Total: $1,234.56")).as_deref(), Some("1234.56"));
        assert_eq!(text_of(currency("$12")).as_deref(), Some("12"));
        assert_eq!(currency("1,234.56 USD"), None);
    }

    #[test]
    fn test_carrier_allow_list() {
        assert_eq!(text_of(carrier("USPS Ground")).as_deref(), Some("USPS"));
        assert_eq!(text_of(carrier("United States Postal Service")).as_deref(), Some("USPS"));
        assert_eq!(text_of(carrier("FedEx Express")).as_deref(), Some("FedEx"));
        assert_eq!(text_of(carrier("Fed Ex Home")).as_deref(), Some("FedEx"));
        assert_eq!(carrier("UPS Ground"), None);
    }

    #[test]
    fn test_bare_numerics_and_sku() {
        assert_eq!(text_of(integer("Qty: 3 units")).as_deref(), Some("3"));
        assert_eq!(integer("none"), None);
        assert_eq!(text_of(decimal("$8.45 est.")).as_deref(), Some("8.45"));
        assert_eq!(text_of(sku("SKU: AB-100")).as_deref(), Some("AB-100"));
        assert_eq!(text_of(sku("sku:XY9")).as_deref(), Some("XY9"));
        assert_eq!(sku("SKU:   "), None);
    }

    #[test]
    fn test_name_from_address_block() {
        assert_eq!(
            text_of(recipient_name("#ICC40235 Jane Smith 123 Main St Springfield IL 62701")).as_deref(),
            Some("Jane Smith")
        );
        assert_eq!(
            text_of(recipient_name("John Doe 555-123-4567")).as_deref(),
            Some("John Doe")
        );
    }

    #[test]
    fn test_name_falls_back_to_alphabetic_words() {
        // Too short for the first strategy: "Al" has two characters
        assert_eq!(text_of(recipient_name("#X1 Al 42 Bo Ng")).as_deref(), Some("Al Bo"));
    }

    #[test]
    fn test_name_falls_back_to_raw_words() {
        assert_eq!(text_of(recipient_name("#A1 12 34")).as_deref(), Some("#A1 12"));
        assert_eq!(recipient_name("   "), None);
    }

    #[test]
    fn test_name_strategies_are_swappable() {
        fn first_word(text: &str) -> Option<String> {
            text.split_whitespace().next().map(String::from)
        }
        assert_eq!(extract_name("Jane Smith", &[first_word]).as_deref(), Some("Jane"));
    }
}

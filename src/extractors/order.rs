// src/extractors/order.rs

// --- Imports ---
use crate::document::Document;
use crate::extractors::fields::{
    ExtractionResult, FieldSpec, FieldValue, Locator, Matcher, Relation,
};
use crate::extractors::normalize;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Dashboard Selectors ---
// Class names carry build hashes; they drift when the dashboard is redeployed.
pub const ACTIVITY_ENTRY: &str =
    ".fulfillment-plan-activity-entry-zYYrn3H.od-canvas-fulfillment-plan-activity-entry";
pub const ADDRESS_BLOCK: &str = ".read-only-address-t7avJZZ";
pub const ITEM_NAME: &str = ".button-link.item-name-E__ZAJW";
pub const ITEM_SKU: &str = ".item-sku-ONq0BTI";
pub const QUANTITY: &str = ".h3-q6GsezA.quantity-text-UmGFNkF";
pub const ORDER_TOTAL: &str = ".description-qbJBh2Z";
pub const SUMMARY_LABEL: &str = ".amount-summary-row-label-Peq42k9";
pub const FIELD_LABEL: &str = ".label-Pg0dC8r.field-label-xuTxiUg";
pub const READONLY_VALUE: &str = ".readonly-value-iLmxDlc";
pub const RATE_CARD_COST: &str = r#".caption-oIOWlTB[aria-describedby="rate-card-label-cost"]"#;
pub const SERVICE_NAME: &str = ".h3-q6GsezA.service-name-gQ0OeUi";

static ORDER_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Order\s*#\s*(\S+)").expect("Failed to compile ORDER_NUMBER_RE")
});

/// The twelve order fields, in the column order of the exported row.
pub static ORDER_FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::new("date", Locator::CaptureDate, normalize::text),
        FieldSpec::new("order_number", Locator::Select(ACTIVITY_ENTRY), normalize::text)
            .matching(Matcher::Capture(ORDER_NUMBER_RE.clone()))
            .with_scan_fallback(),
        FieldSpec::new(
            "recipient",
            Locator::Scoped { container: ADDRESS_BLOCK, inner: "div" },
            normalize::recipient_name,
        ),
        FieldSpec::new("item_name", Locator::Select(ITEM_NAME), normalize::text),
        FieldSpec::new("sku", Locator::Select(ITEM_SKU), normalize::sku),
        FieldSpec::new("quantity", Locator::Select(QUANTITY), normalize::integer),
        FieldSpec::new("order_total", Locator::Select(ORDER_TOTAL), normalize::currency),
        FieldSpec::new(
            "shipping_total",
            Locator::Labelled {
                labels: SUMMARY_LABEL,
                contains: "Shipping",
                value: Relation::NextSibling,
            },
            normalize::currency,
        ),
        FieldSpec::new(
            "weight",
            Locator::Labelled {
                labels: FIELD_LABEL,
                contains: "Weight",
                value: Relation::InParent(READONLY_VALUE),
            },
            normalize::weight,
        ),
        FieldSpec::new(
            "dimension",
            Locator::Labelled {
                labels: FIELD_LABEL,
                contains: "Size (in)",
                value: Relation::InParent(READONLY_VALUE),
            },
            normalize::dimensions,
        ),
        FieldSpec::new("shipping", Locator::Select(RATE_CARD_COST), normalize::decimal),
        FieldSpec::new("carrier", Locator::Select(SERVICE_NAME), normalize::carrier),
    ]
});

// --- Extractor ---

/// Resolves a fixed list of fields against page snapshots.
pub struct OrderExtractor {
    fields: Vec<FieldSpec>,
}

impl Default for OrderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderExtractor {
    /// Extractor for the shipping dashboard's twelve order fields.
    pub fn new() -> Self {
        Self::with_fields(ORDER_FIELDS.to_vec())
    }

    pub fn with_fields(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Resolves every declared field. Never fails: a field that cannot be
    /// resolved, or whose lookup errors, takes its fallback value.
    pub fn extract<D: Document>(&self, document: &D) -> ExtractionResult {
        tracing::debug!("Starting extraction of {} fields", self.fields.len());

        let values = self
            .fields
            .iter()
            .map(|field| {
                let value = match self.resolve(document, field) {
                    Ok(Some(value)) => value,
                    Ok(None) => {
                        tracing::debug!("Field '{}' not found, using fallback", field.name);
                        field.fallback.clone()
                    }
                    Err(e) => {
                        tracing::warn!("Error extracting field '{}': {}", field.name, e);
                        field.fallback.clone()
                    }
                };
                (field.name, value)
            })
            .collect();

        let result = ExtractionResult::new(values);
        tracing::info!("Extracted {} fields", result.coverage());
        result
    }

    /// Locate, match, then normalize one field. First matching candidate wins.
    fn resolve<D: Document>(
        &self,
        document: &D,
        field: &FieldSpec,
    ) -> Result<Option<FieldValue>, ExtractError> {
        let mut candidates = self.locate(document, &field.locate)?;

        if candidates.is_empty() && field.scan_fallback {
            tracing::debug!("No candidates for '{}', scanning all text nodes", field.name);
            candidates = document
                .scan()
                .into_iter()
                .map(|node| document.text(node))
                .collect();
        }
        tracing::trace!("Field '{}' has {} candidates", field.name, candidates.len());

        let Some(raw) = candidates.iter().find_map(|text| field.matcher.apply(text)) else {
            return Ok(None);
        };
        tracing::trace!("Field '{}' matched raw text '{}'", field.name, raw);

        Ok((field.parse)(&raw).filter(FieldValue::is_resolved))
    }

    /// Candidate texts for a locator, in document order.
    fn locate<D: Document>(
        &self,
        document: &D,
        locator: &Locator,
    ) -> Result<Vec<String>, ExtractError> {
        match locator {
            Locator::CaptureDate => Ok(document
                .captured_on()
                .map(|date| date.format("%-m/%-d/%Y").to_string())
                .into_iter()
                .collect()),

            Locator::Select(selector) => Ok(document
                .select(selector)?
                .into_iter()
                .map(|node| document.text(node))
                .collect()),

            Locator::Scoped { container, inner } => {
                let mut texts = Vec::new();
                for block in document.select(container)? {
                    let target = document
                        .select_within(block, inner)?
                        .into_iter()
                        .next()
                        .unwrap_or(block);
                    texts.push(document.text(target));
                }
                Ok(texts)
            }

            Locator::Labelled { labels, contains, value } => {
                let mut texts = Vec::new();
                for label in document.select(labels)? {
                    if !document.text(label).contains(contains) {
                        continue;
                    }
                    let target = match value {
                        Relation::NextSibling => document.next_sibling(label),
                        Relation::InParent(selector) => match document.parent(label) {
                            Some(parent) => document.select_within(parent, selector)?.into_iter().next(),
                            None => {
                                return Err(ExtractError::MalformedDocument(format!(
                                    "label '{}' has no parent element",
                                    labels
                                )))
                            }
                        },
                    };
                    if let Some(node) = target {
                        texts.push(document.text(node));
                    }
                }
                Ok(texts)
            }
        }
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;
    use crate::extractors::fields::{Coverage, SENTINEL};
    use chrono::NaiveDate;

    const FULL_PAGE: &str = r#"
        <html><body>
          <div class="fulfillment-plan-activity-entry-zYYrn3H od-canvas-fulfillment-plan-activity-entry">Label purchased</div>
          <div class="fulfillment-plan-activity-entry-zYYrn3H od-canvas-fulfillment-plan-activity-entry">Order # 112-9938 was placed</div>
          <div class="read-only-address-t7avJZZ">
            <div>#ICC40235 Jane Smith</div>
            <div>123 Main St</div>
            <div>Springfield IL 62701</div>
          </div>
          <a class="button-link item-name-E__ZAJW"> Ceramic Mug Set </a>
          <span class="item-sku-ONq0BTI">SKU: MUG-4PK</span>
          <span class="h3-q6GsezA quantity-text-UmGFNkF">Qty 2</span>
          <div class="description-qbJBh2Z">Order total $1,234.56</div>
          <div class="summary">
            <div class="amount-summary-row-label-Peq42k9">Subtotal</div>
            <div>$1,220.00</div>
            <div class="amount-summary-row-label-Peq42k9">Shipping</div>
            <div>$14.56</div>
          </div>
          <div class="field">
            <span class="label-Pg0dC8r field-label-xuTxiUg">Weight</span>
            <span class="readonly-value-iLmxDlc">5 lb 8 oz</span>
          </div>
          <div class="field">
            <span class="label-Pg0dC8r field-label-xuTxiUg">Size (in)</span>
            <span class="readonly-value-iLmxDlc">16 x 13 x 5</span>
          </div>
          <span class="caption-oIOWlTB" aria-describedby="rate-card-label-cost">$9.85</span>
          <span class="h3-q6GsezA service-name-gQ0OeUi">USPS Ground Advantage</span>
        </body></html>
    "#;

    fn capture_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn test_full_page_resolves_every_field() {
        let doc = HtmlDocument::parse(FULL_PAGE).with_capture_date(capture_date());
        let result = OrderExtractor::new().extract(&doc);

        assert_eq!(result.get("date"), Some(&text("3/7/2026")));
        assert_eq!(result.get("order_number"), Some(&text("112-9938")));
        assert_eq!(result.get("recipient"), Some(&text("Jane Smith")));
        assert_eq!(result.get("item_name"), Some(&text("Ceramic Mug Set")));
        assert_eq!(result.get("sku"), Some(&text("MUG-4PK")));
        assert_eq!(result.get("quantity"), Some(&text("2")));
        assert_eq!(result.get("order_total"), Some(&text("1234.56")));
        assert_eq!(result.get("shipping_total"), Some(&text("14.56")));
        assert_eq!(result.get("weight"), Some(&FieldValue::Number(5.5)));
        assert_eq!(result.get("dimension"), Some(&text("16x13x5")));
        assert_eq!(result.get("shipping"), Some(&text("9.85")));
        assert_eq!(result.get("carrier"), Some(&text("USPS")));

        assert_eq!(result.coverage(), Coverage { resolved: 12, total: 12 });
        assert!(result.coverage().is_complete());
    }

    #[test]
    fn test_unrelated_page_yields_all_sentinels() {
        let doc = HtmlDocument::parse("<html><body><p>Nothing to see</p></body></html>");
        let result = OrderExtractor::new().extract(&doc);

        assert_eq!(result.names().count(), 12);
        assert!(result.values().all(|v| *v == FieldValue::Absent));
        assert_eq!(result.coverage().to_string(), "0/12");
    }

    #[test]
    fn test_result_keeps_declaration_order() {
        let doc = HtmlDocument::parse("");
        let result = OrderExtractor::new().extract(&doc);
        let declared: Vec<&str> = ORDER_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(result.names().collect::<Vec<_>>(), declared);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = HtmlDocument::parse(FULL_PAGE).with_capture_date(capture_date());
        let extractor = OrderExtractor::new();
        assert_eq!(extractor.extract(&doc), extractor.extract(&doc));
    }

    #[test]
    fn test_order_number_falls_back_to_page_scan() {
        let html = r#"<html><body><section><p>Thanks! Order #A77-310 confirmed</p></section></body></html>"#;
        let result = OrderExtractor::new().extract(&HtmlDocument::parse(html));
        assert_eq!(result.get("order_number"), Some(&text("A77-310")));
    }

    #[test]
    fn test_recipient_uses_block_text_without_inner_div() {
        let html = r#"<span class="read-only-address-t7avJZZ">Bob Stone 77 Elm Rd</span>"#;
        let result = OrderExtractor::new().extract(&HtmlDocument::parse(html));
        assert_eq!(result.get("recipient"), Some(&text("Bob Stone")));
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let html = r#"
            <div class="fulfillment-plan-activity-entry-zYYrn3H od-canvas-fulfillment-plan-activity-entry">Order # A1</div>
            <div class="fulfillment-plan-activity-entry-zYYrn3H od-canvas-fulfillment-plan-activity-entry">Order # B2</div>
        "#;
        let result = OrderExtractor::new().extract(&HtmlDocument::parse(html));
        assert_eq!(result.get("order_number"), Some(&text("A1")));
    }

    #[test]
    fn test_only_first_candidate_is_normalized() {
        // The first carrier element does not pass the allow-list; the second is never tried
        let html = r#"
            <span class="h3-q6GsezA service-name-gQ0OeUi">UPS</span>
            <span class="h3-q6GsezA service-name-gQ0OeUi">USPS</span>
        "#;
        let result = OrderExtractor::new().extract(&HtmlDocument::parse(html));
        assert_eq!(result.get("carrier"), Some(&FieldValue::Absent));
        assert_eq!(result.coverage().resolved, 0);
    }

    #[test]
    fn test_unknown_carrier_is_sentinel_even_with_text() {
        let html = r#"<span class="h3-q6GsezA service-name-gQ0OeUi">UPS Ground</span>"#;
        let result = OrderExtractor::new().extract(&HtmlDocument::parse(html));
        assert_eq!(result.get("carrier"), Some(&FieldValue::Absent));
        assert_eq!(result.get("carrier").unwrap().to_string(), SENTINEL);
    }

    #[test]
    fn test_invalid_selector_only_affects_its_field() {
        let broken = FieldSpec::new("broken", Locator::Select("div[["), normalize::text);
        let item = FieldSpec::new("item_name", Locator::Select(ITEM_NAME), normalize::text);
        let extractor = OrderExtractor::with_fields(vec![broken, item]);

        let result = extractor.extract(&HtmlDocument::parse(FULL_PAGE));
        assert_eq!(result.get("broken"), Some(&FieldValue::Absent));
        assert_eq!(result.get("item_name"), Some(&text("Ceramic Mug Set")));
    }

    #[test]
    fn test_literal_fallback_replaces_sentinel() {
        let field = FieldSpec::new("carrier", Locator::Select(SERVICE_NAME), normalize::carrier)
            .with_fallback(text("Other"));
        let extractor = OrderExtractor::with_fields(vec![field]);
        let result = extractor.extract(&HtmlDocument::parse(""));
        assert_eq!(result.get("carrier"), Some(&text("Other")));
    }

    /// Document whose every lookup fails, as a live page mid-navigation might.
    struct BrokenDocument;

    impl Document for BrokenDocument {
        type Node<'a> = ();

        fn select<'a>(&'a self, selector: &str) -> Result<Vec<()>, ExtractError> {
            Err(ExtractError::MalformedDocument(format!("cannot query '{}'", selector)))
        }
        fn select_within<'a>(&'a self, _scope: (), selector: &str) -> Result<Vec<()>, ExtractError> {
            self.select(selector)
        }
        fn text<'a>(&'a self, _node: ()) -> String {
            String::new()
        }
        fn next_sibling<'a>(&'a self, _node: ()) -> Option<()> {
            None
        }
        fn parent<'a>(&'a self, _node: ()) -> Option<()> {
            None
        }
        fn scan<'a>(&'a self) -> Vec<()> {
            Vec::new()
        }
        fn captured_on(&self) -> Option<NaiveDate> {
            None
        }
    }

    #[test]
    fn test_failing_document_still_returns_complete_result() {
        let result = OrderExtractor::new().extract(&BrokenDocument);
        assert_eq!(result.names().count(), 12);
        assert_eq!(result.coverage(), Coverage { resolved: 0, total: 12 });
    }

    #[test]
    fn test_label_without_value_element_is_sentinel() {
        let html = r#"
            <div><span class="label-Pg0dC8r field-label-xuTxiUg">Weight</span></div>
        "#;
        let result = OrderExtractor::new().extract(&HtmlDocument::parse(html));
        assert_eq!(result.get("weight"), Some(&FieldValue::Absent));
    }
}

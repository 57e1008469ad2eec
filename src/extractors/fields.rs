// src/extractors/fields.rs

// --- Imports ---
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Placeholder written for any field that could not be resolved.
pub const SENTINEL: &str = "N/A";

// --- Values ---

/// Canonical value of one extracted field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// The field could not be resolved; renders as [`SENTINEL`].
    Absent,
}

impl FieldValue {
    pub fn is_resolved(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.is_empty() && text != SENTINEL,
            FieldValue::Number(_) => true,
            FieldValue::Absent => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{}", number),
            FieldValue::Absent => f.write_str(SENTINEL),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Number(number) => serializer.serialize_f64(*number),
            FieldValue::Absent => serializer.serialize_str(SENTINEL),
        }
    }
}

// --- Field Declarations ---

/// Where the candidate elements for a field come from.
#[derive(Debug, Clone)]
pub enum Locator {
    /// Every element matching the selector.
    Select(&'static str),
    /// Label elements whose text contains `contains`; the value element is
    /// reached from each matching label.
    Labelled {
        labels: &'static str,
        contains: &'static str,
        value: Relation,
    },
    /// For each container, its first descendant matching `inner`, or the
    /// container itself when it has none.
    Scoped {
        container: &'static str,
        inner: &'static str,
    },
    /// The date the snapshot was taken.
    CaptureDate,
}

/// How a value element is reached from its label.
#[derive(Debug, Clone)]
pub enum Relation {
    NextSibling,
    /// First match of the selector under the label's parent.
    InParent(&'static str),
}

/// How a candidate's text is turned into the raw text handed to the parser.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Any candidate with non-blank text matches as a whole.
    Whole,
    /// First capture group of the pattern.
    Capture(Regex),
}

impl Matcher {
    pub fn apply(&self, text: &str) -> Option<String> {
        match self {
            Matcher::Whole => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Matcher::Capture(re) => re
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }
}

/// Normalization step: raw matched text to a canonical value, `None` when
/// the text holds nothing recognizable.
pub type Normalizer = fn(&str) -> Option<FieldValue>;

/// Declarative description of one extractable field.
#[derive(Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub locate: Locator,
    /// Scan all text-bearing nodes when the locator finds nothing.
    pub scan_fallback: bool,
    pub matcher: Matcher,
    pub parse: Normalizer,
    pub fallback: FieldValue,
}

impl FieldSpec {
    pub fn new(name: &'static str, locate: Locator, parse: Normalizer) -> Self {
        Self {
            name,
            locate,
            scan_fallback: false,
            matcher: Matcher::Whole,
            parse,
            fallback: FieldValue::Absent,
        }
    }

    pub fn matching(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_scan_fallback(mut self) -> Self {
        self.scan_fallback = true;
        self
    }
}

#[cfg(test)]
impl FieldSpec {
    pub fn with_fallback(mut self, fallback: FieldValue) -> Self {
        self.fallback = fallback;
        self
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("locate", &self.locate)
            .field("scan_fallback", &self.scan_fallback)
            .field("matcher", &self.matcher)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

// --- Results ---

/// Resolved / declared field counts for one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub resolved: usize,
    pub total: usize,
}

/// How usable an extraction is, graded on its coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageStatus {
    Complete,
    /// At least 70% of the fields resolved.
    Partial,
    Limited,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.resolved >= self.total
    }

    /// Resolved share rounded to a whole percent. An empty field list counts as 100.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (self.resolved as f64 * 100.0 / self.total as f64).round() as u32
    }

    pub fn status(&self) -> CoverageStatus {
        if self.is_complete() {
            CoverageStatus::Complete
        } else if self.resolved * 10 >= self.total * 7 {
            CoverageStatus::Partial
        } else {
            CoverageStatus::Limited
        }
    }

    /// One-line summary for operators, e.g. `Partial success: 9/12 fields extracted (75%)`.
    pub fn summary(&self) -> String {
        match self.status() {
            CoverageStatus::Complete => format!("Success! {} fields extracted ({}%)", self, self.percent()),
            CoverageStatus::Partial => format!("Partial success: {} fields extracted ({}%)", self, self.percent()),
            CoverageStatus::Limited => format!("Limited data: Only {} fields extracted ({}%)", self, self.percent()),
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resolved, self.total)
    }
}

/// Values for every declared field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    fields: Vec<(&'static str, FieldValue)>,
}

impl ExtractionResult {
    pub(crate) fn new(fields: Vec<(&'static str, FieldValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    /// Names of the fields that hold no usable value, in declaration order.
    pub fn missing(&self) -> Vec<&'static str> {
        self.names()
            .zip(self.values())
            .filter(|(_, value)| !value.is_resolved())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn coverage(&self) -> Coverage {
        Coverage {
            resolved: self.values().filter(|v| v.is_resolved()).count(),
            total: self.fields.len(),
        }
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

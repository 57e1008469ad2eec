// src/document/html.rs

// --- Imports ---
use crate::document::Document;
use crate::utils::error::ExtractError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
// Elements that typically carry visible text on the dashboard pages
static TEXT_BEARING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div, span, p, li")
        .expect("Failed to compile TEXT_BEARING_SELECTOR")
});

/// A parsed HTML page snapshot backed by `scraper`.
pub struct HtmlDocument {
    html: Html,
    captured_on: Option<NaiveDate>,
}

impl HtmlDocument {
    /// Parses a full HTML document. The snapshot carries no capture date.
    pub fn parse(html_content: &str) -> Self {
        let html = Html::parse_document(html_content);
        if !html.errors.is_empty() {
            tracing::trace!("HTML parser reported {} recoverable errors", html.errors.len());
        }
        Self { html, captured_on: None }
    }

    /// Stamps the snapshot with the day it was taken.
    pub fn with_capture_date(mut self, date: NaiveDate) -> Self {
        self.captured_on = Some(date);
        self
    }

    fn compile(selector: &str) -> Result<Selector, ExtractError> {
        Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{:?}", e),
        })
    }
}

impl Document for HtmlDocument {
    type Node<'a> = ElementRef<'a>;

    fn select<'a>(&'a self, selector: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        let compiled = Self::compile(selector)?;
        Ok(self.html.select(&compiled).collect())
    }

    fn select_within<'a>(
        &'a self,
        scope: ElementRef<'a>,
        selector: &str,
    ) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        let compiled = Self::compile(selector)?;
        // ElementRef::select also tests the scope element itself; keep descendants only
        Ok(scope
            .select(&compiled)
            .filter(|el| el.id() != scope.id())
            .collect())
    }

    fn text<'a>(&'a self, node: ElementRef<'a>) -> String {
        node.text().collect::<String>()
    }

    fn next_sibling<'a>(&'a self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        node.next_siblings().find_map(ElementRef::wrap)
    }

    fn parent<'a>(&'a self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        node.parent().and_then(ElementRef::wrap)
    }

    fn scan<'a>(&'a self) -> Vec<ElementRef<'a>> {
        self.html.select(&TEXT_BEARING_SELECTOR).collect()
    }

    fn captured_on(&self) -> Option<NaiveDate> {
        self.captured_on
    }
}

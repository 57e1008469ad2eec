// src/document/mod.rs
pub mod html;

use chrono::NaiveDate;
use crate::utils::error::ExtractError;

pub use html::HtmlDocument;

/// Read-only view of a page snapshot, as needed by the field extractor.
///
/// Nodes are cheap handles borrowed from the document. Lookups return matches
/// in document order.
pub trait Document {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// All elements matching a CSS selector.
    fn select<'a>(&'a self, selector: &str) -> Result<Vec<Self::Node<'a>>, ExtractError>;

    /// Elements matching a CSS selector below `scope` (descendants only).
    fn select_within<'a>(
        &'a self,
        scope: Self::Node<'a>,
        selector: &str,
    ) -> Result<Vec<Self::Node<'a>>, ExtractError>;

    /// Concatenated text content of a node and its descendants.
    fn text<'a>(&'a self, node: Self::Node<'a>) -> String;

    /// Next element sibling, skipping text and comment nodes.
    fn next_sibling<'a>(&'a self, node: Self::Node<'a>) -> Option<Self::Node<'a>>;

    fn parent<'a>(&'a self, node: Self::Node<'a>) -> Option<Self::Node<'a>>;

    /// Every text-bearing node in the document, used when a precise selector
    /// no longer matches the markup.
    fn scan<'a>(&'a self) -> Vec<Self::Node<'a>>;

    /// Day the snapshot was taken, if the host recorded one.
    fn captured_on(&self) -> Option<NaiveDate>;
}

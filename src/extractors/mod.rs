// src/extractors/mod.rs
pub mod fields;
pub mod normalize;
pub mod order;

// Re-export key extraction types for convenience
pub use fields::{CoverageStatus, SENTINEL};
pub use order::{OrderExtractor, ORDER_FIELDS};

// src/storage/mod.rs
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::extractors::fields::ExtractionResult;
use crate::utils::error::StorageError;

/// Column separator of exported rows.
pub const FIELD_SEPARATOR: &str = "\t";

const ROWS_FILE: &str = "orders.tsv";

/// Joins the values of a result positionally, one column per declared field.
/// Tabs and line breaks inside a value are collapsed to a space so a value
/// can never spill into the next column or row.
pub fn format_row(result: &ExtractionResult) -> String {
    result
        .values()
        .map(|value| {
            value
                .to_string()
                .split(['\t', '\n', '\r'])
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Appends the result as one line of the shared rows file
    pub fn append_row(&self, result: &ExtractionResult) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(ROWS_FILE);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;
        writeln!(file, "{}", format_row(result))?;

        tracing::info!("Appended row to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves values and coverage of one extraction as JSON
    pub fn save_metadata(&self, result: &ExtractionResult, source: &str) -> Result<PathBuf, StorageError> {
        let extracted_at = chrono::Utc::now();
        let stem = match result.get("order_number").filter(|v| v.is_resolved()) {
            Some(order) => sanitize_file_stem(&order.to_string()),
            None => format!("unknown_{}", extracted_at.format("%Y%m%dT%H%M%S")),
        };
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let coverage = result.coverage();
        let metadata = serde_json::json!({
            "source": source,
            "fields": result,
            "resolved_fields": coverage.resolved,
            "total_fields": coverage.total,
            "extraction_timestamp": extracted_at.to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

// src/utils/html_debug.rs
use std::fs;
use std::path::Path;
use regex::Regex;
use crate::extractors::fields::{FieldSpec, Locator, Relation};
use crate::utils::error::AppError;

/// Writes a copy of the snapshot with a visible marker in front of every
/// element a field's selectors anchor on, so markup drift is easy to spot.
pub fn save_annotated_snapshot(html: &str, filename: &Path, fields: &[FieldSpec]) -> Result<(), AppError> {
    let annotated = annotate_field_anchors(html, fields)?;
    fs::write(filename, annotated)?;

    tracing::info!("Saved annotated snapshot to {}", filename.display());
    Ok(())
}

/// Returns the snapshot with `<mark>` labels inserted before anchor elements.
pub fn annotate_field_anchors(html: &str, fields: &[FieldSpec]) -> Result<String, AppError> {
    let mut markers: Vec<(usize, String)> = Vec::new();

    for field in fields {
        for class_name in anchor_classes(&field.locate) {
            // Opening tag whose class attribute carries the anchor class
            let pattern = format!(
                r#"<[A-Za-z][A-Za-z0-9]*[^>]*\sclass\s*=\s*["'](?:[^"']*\s)?{}(?:\s[^"']*)?["'][^>]*>"#,
                regex::escape(class_name)
            );
            let re = Regex::new(&pattern).map_err(|e| {
                AppError::Config(format!("Invalid anchor pattern for field '{}': {}", field.name, e))
            })?;

            let found: Vec<usize> = re.find_iter(html).map(|m| m.start()).collect();
            if found.is_empty() {
                tracing::warn!("No element carries class '{}' used by field '{}'", class_name, field.name);
            }
            for start in found {
                markers.push((start, format!(
                    "<mark class=\"field-anchor\" title=\"{} ({})\">{}</mark>",
                    field.name, class_name, field.name
                )));
            }
        }
    }

    // Stable sort keeps declaration order for markers at the same position
    markers.sort_by_key(|(position, _)| *position);

    let mut debug_html = String::with_capacity(html.len() + markers.len() * 64);
    debug_html.push_str("<style>.field-anchor { background-color: #FFFF00; font: 11px monospace; }</style>\n");

    let mut last_pos = 0;
    for (position, marker) in &markers {
        debug_html.push_str(&html[last_pos..*position]);
        debug_html.push_str(marker);
        last_pos = *position;
    }
    debug_html.push_str(&html[last_pos..]);

    Ok(debug_html)
}

/// First class name of each selector a locator depends on.
fn anchor_classes(locator: &Locator) -> Vec<&'static str> {
    let selectors: Vec<&'static str> = match locator {
        Locator::Select(selector) => vec![*selector],
        Locator::Scoped { container, .. } => vec![*container],
        Locator::Labelled { labels, value, .. } => match value {
            Relation::NextSibling => vec![*labels],
            Relation::InParent(inner) => vec![*labels, *inner],
        },
        Locator::CaptureDate => Vec::new(),
    };

    selectors
        .into_iter()
        .filter_map(first_class)
        .collect()
}

fn first_class(selector: &'static str) -> Option<&'static str> {
    let start = selector.find('.')? + 1;
    let rest = &selector[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

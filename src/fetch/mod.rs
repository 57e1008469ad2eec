// src/fetch/mod.rs
pub mod client;

use std::path::PathBuf;
use crate::utils::error::FetchError;

/// Where a page snapshot is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
    Url(String),
}

impl Source {
    /// `-` selects stdin, anything else is a file path.
    pub fn from_input(input: &str) -> Self {
        if input == "-" {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(input))
        }
    }
}

/// Reads the full HTML of a snapshot.
pub async fn load_snapshot(source: &Source) -> Result<String, FetchError> {
    match source {
        Source::File(path) => {
            tracing::info!("Reading page snapshot from {}", path.display());
            Ok(tokio::fs::read_to_string(path).await?)
        }
        Source::Stdin => {
            use tokio::io::AsyncReadExt;
            tracing::info!("Reading page snapshot from stdin");
            let mut html = String::new();
            tokio::io::stdin().read_to_string(&mut html).await?;
            Ok(html)
        }
        Source::Url(url) => client::download_page(url).await,
    }
}

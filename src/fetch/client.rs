// src/fetch/client.rs
use crate::utils::error::FetchError;
use reqwest::header;

const USER_AGENT: &str = concat!("order_extractor/", env!("CARGO_PKG_VERSION"));

/// Creates a reqwest client configured for page downloads.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        // Can add more config like timeouts here
        .build()
}

/// Downloads a page snapshot from its URL.
pub async fn download_page(url: &str) -> Result<String, FetchError> {
    let client = build_client()?; // Propagate client build error if any

    tracing::info!("Downloading page from: {}", url);
    tracing::debug!("Using User-Agent: {}", USER_AGENT);

    let response = client.get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await?; // Propagates reqwest::Error as FetchError::Network

    // Check if the request was successful (status code 2xx)
    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("Received {} - the page likely requires a signed-in session.", status);
            return Err(FetchError::Forbidden(url.to_string()));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!("Received 404 Not Found for URL: {}", url);
            return Err(FetchError::PageNotFound(url.to_string()));
        }
        return Err(FetchError::Http(status));
    }

    let body = response.text().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}

//! Shared HTTP client construction policy for provider adapters.
//!
//! Centralizes timeout, user-agent, and compression defaults so the four
//! adapters stay consistent on transport behavior.

use std::time::Duration;

use reqwest::Client;

use super::error::ProviderError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Shared user-agent for all provider traffic.
pub(crate) fn default_user_agent() -> String {
    format!("cdnget/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds a provider HTTP client using shared project policy.
///
/// `provider` is used only in error messages, not in the User-Agent header.
///
/// # Errors
///
/// Returns [`ProviderError::ClientBuild`] when client construction fails.
pub(crate) fn build_provider_client(provider: &str) -> Result<Client, ProviderError> {
    base_builder()
        .build()
        .map_err(|e| ProviderError::client_build(provider, e.to_string()))
}

/// Builds a client that never follows redirects.
///
/// Used by the UNPKG adapter's `latest_version` optimization, which reads
/// the version tag out of a `Location` header instead of following it.
///
/// # Errors
///
/// Returns [`ProviderError::ClientBuild`] when client construction fails.
pub(crate) fn build_no_redirect_client(provider: &str) -> Result<Client, ProviderError> {
    base_builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| ProviderError::client_build(provider, e.to_string()))
}

fn base_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(default_user_agent())
        .gzip(true)
}

/// Performs a GET and returns the body as text, mapping non-success
/// statuses to [`ProviderError::Http`].
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, ProviderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::network(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::http(
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("error"),
        ));
    }
    response
        .text()
        .await
        .map_err(|e| ProviderError::network(url, e))
}

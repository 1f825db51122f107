//! HTTP client for the backend's public perk collection endpoint.

use std::time::Duration;

use perkdir_core::{AppConfig, PerkRecord};
use reqwest::{Client, Url};

use crate::error::ClientError;
use crate::source::PerkSource;
use crate::types::parse_perks_body;

/// Fetches the public perk collection with a single GET.
///
/// Non-2xx responses and unparseable bodies come back as typed errors.
/// There is no retry; a failed load is reported once and retrying is up to
/// the caller.
pub struct PerksClient {
    client: Client,
    perks_url: Url,
}

impl PerksClient {
    /// Creates a `PerksClient` for `{base_url}/{perks_path}` with the given
    /// whole-request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if the joined URL does not parse or
    ///   is not http(s).
    /// - [`ClientError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        base_url: &str,
        perks_path: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let perks_url = build_perks_url(base_url, perks_path)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, perks_url })
    }

    /// Creates a `PerksClient` from application configuration.
    ///
    /// # Errors
    ///
    /// See [`PerksClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            &config.perks_path,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn perks_url(&self) -> &str {
        self.perks_url.as_str()
    }

    /// Fetches every public perk.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] — HTTP 404.
    /// - [`ClientError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ClientError::Http`] — network, TLS or timeout failure.
    /// - [`ClientError::Deserialize`] — body is not a perk array or envelope.
    pub async fn fetch_perks(&self) -> Result<Vec<PerkRecord>, ClientError> {
        let url = self.perks_url.as_str();
        tracing::debug!(url, "fetching public perks");

        let response = self
            .client
            .get(self.perks_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        parse_perks_body(&body, &format!("perk collection from {url}"))
    }
}

impl PerkSource for PerksClient {
    fn fetch_public_perks(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<PerkRecord>, ClientError>> + Send {
        self.fetch_perks()
    }
}

/// Joins the base URL and collection path into one absolute http(s) URL.
fn build_perks_url(base_url: &str, perks_path: &str) -> Result<Url, ClientError> {
    let joined = format!(
        "{}/{}",
        base_url.trim().trim_end_matches('/'),
        perks_path.trim().trim_start_matches('/')
    );
    let url = Url::parse(&joined).map_err(|e| ClientError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }

    Ok(url)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

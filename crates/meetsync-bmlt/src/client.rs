//! HTTP client for the BMLT Admin API v4.
//!
//! Wraps `reqwest` with token login, typed errors, and the status-only
//! liveness probe the daemon polls at startup. Redirects are never followed
//! implicitly; the login path follows them manually so the POST method and
//! body survive a front proxy redirecting to `/main_server`.

use std::time::Duration;

use reqwest::{redirect, Client, StatusCode, Url};
use serde_json::Value;

use crate::error::BmltError;
use crate::types::{Format, FormatIndex, MeetingPayload};

/// Redirect budget for the login POST.
const MAX_LOGIN_REDIRECTS: usize = 3;

/// How much response body to keep in error messages.
const BODY_SNIPPET_LEN: usize = 512;

/// Client for the BMLT Admin API v4.
pub struct BmltClient {
    client: Client,
    base_url: String,
    api_prefix: String,
}

impl BmltClient {
    /// Creates a client for the server at `base_url` with its API mounted
    /// under `api_prefix` (usually `/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`BmltError::InvalidBaseUrl`] if `base_url` lacks an
    /// `http://`/`https://` scheme, or [`BmltError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        api_prefix: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, BmltError> {
        let base_url = base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BmltError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "must include http:// or https://".to_owned(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        let mut api_prefix = api_prefix.trim().trim_end_matches('/').to_owned();
        if !api_prefix.is_empty() && !api_prefix.starts_with('/') {
            api_prefix.insert(0, '/');
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_prefix,
        })
    }

    /// The URL the readiness probe targets: base URL + API prefix.
    #[must_use]
    pub fn probe_url(&self) -> String {
        format!("{}{}", self.base_url, self.api_prefix)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{path}", self.base_url, self.api_prefix)
    }

    /// Status-only liveness probe: GET the API prefix and report the status
    /// code, without looking at the body.
    ///
    /// # Errors
    ///
    /// Returns [`BmltError::Http`] on network failure; any HTTP status is an
    /// `Ok` — the caller decides which codes count as "up".
    pub async fn probe(&self) -> Result<u16, BmltError> {
        let response = self.client.get(self.probe_url()).send().await?;
        Ok(response.status().as_u16())
    }

    /// Logs in against `/auth/token` and returns the bearer token.
    ///
    /// Follows up to [`MAX_LOGIN_REDIRECTS`] redirects manually, re-issuing
    /// the POST with its body each time. The token is accepted from any of
    /// the envelope shapes seen across server versions: `token`,
    /// `access_token`, or `data.token`.
    ///
    /// # Errors
    ///
    /// - [`BmltError::UnexpectedStatus`] on a non-2xx, non-redirect answer
    ///   (401 for bad credentials lands here).
    /// - [`BmltError::TooManyRedirects`] past the redirect budget.
    /// - [`BmltError::MissingToken`] when a 2xx body has no token.
    /// - [`BmltError::Http`] / [`BmltError::Deserialize`] on transport or
    ///   body-shape failures.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, BmltError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let mut url = self.endpoint("/auth/token");
        let mut redirects = 0usize;

        loop {
            let response = self
                .client
                .post(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&body)
                .send()
                .await?;
            let status = response.status();

            if status.is_redirection() {
                if redirects >= MAX_LOGIN_REDIRECTS {
                    return Err(BmltError::TooManyRedirects {
                        limit: MAX_LOGIN_REDIRECTS,
                    });
                }
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(BmltError::TooManyRedirects {
                        limit: MAX_LOGIN_REDIRECTS,
                    })?;
                url = resolve_location(&url, location)?;
                redirects += 1;
                tracing::debug!(redirects, %url, "following login redirect");
                continue;
            }

            if !status.is_success() {
                return Err(unexpected_status(status, &url, response).await);
            }

            let text = response.text().await?;
            let envelope: Value =
                serde_json::from_str(&text).map_err(|e| BmltError::Deserialize {
                    context: "auth/token response".to_owned(),
                    source: e,
                })?;
            return extract_token(&envelope).ok_or(BmltError::MissingToken);
        }
    }

    /// Fetches `/formats` and builds the [`FormatIndex`] used to validate
    /// meeting format ids.
    ///
    /// # Errors
    ///
    /// - [`BmltError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`BmltError::Deserialize`] if the body is not a format list.
    /// - [`BmltError::Http`] on network failure.
    pub async fn get_formats(&self, token: &str) -> Result<FormatIndex, BmltError> {
        let url = self.endpoint("/formats");
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(unexpected_status(status, &url, response).await);
        }

        let text = response.text().await?;
        let formats: Vec<Format> =
            serde_json::from_str(&text).map_err(|e| BmltError::Deserialize {
                context: "formats response (expected list)".to_owned(),
                source: e,
            })?;
        Ok(FormatIndex::from_formats(&formats))
    }

    /// Creates a meeting via `POST /meetings`.
    ///
    /// # Errors
    ///
    /// - [`BmltError::UnexpectedStatus`] on a non-2xx answer, carrying a
    ///   body snippet with the server's validation message.
    /// - [`BmltError::Http`] on network failure.
    pub async fn create_meeting(
        &self,
        token: &str,
        payload: &MeetingPayload,
    ) -> Result<(), BmltError> {
        let url = self.endpoint("/meetings");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload.to_wire())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(unexpected_status(status, &url, response).await);
        }
        Ok(())
    }
}

/// Resolves a `Location` header value against the URL that produced it.
fn resolve_location(current: &str, location: &str) -> Result<String, BmltError> {
    let base = Url::parse(current).map_err(|e| BmltError::InvalidBaseUrl {
        url: current.to_owned(),
        reason: e.to_string(),
    })?;
    let resolved = base.join(location).map_err(|e| BmltError::InvalidBaseUrl {
        url: location.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(resolved.to_string())
}

/// Pulls the token out of any of the known login envelope shapes.
fn extract_token(envelope: &Value) -> Option<String> {
    envelope
        .get("token")
        .or_else(|| envelope.get("access_token"))
        .or_else(|| envelope.get("data").and_then(|d| d.get("token")))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

async fn unexpected_status(status: StatusCode, url: &str, response: reqwest::Response) -> BmltError {
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    BmltError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_owned(),
        body: snippet,
    }
}

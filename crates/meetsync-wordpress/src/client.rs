//! HTTP client for the WordPress REST API's meeting listing.
//!
//! WordPress pages results with `per_page`/`page` query parameters and
//! signals past-the-end with HTTP 400 (or 404 when the route is gone), so
//! pagination treats those statuses as a normal end of data rather than an
//! error.

use std::time::Duration;

use reqwest::Client;

use crate::error::WordPressError;
use crate::types::WpMeeting;

const MEETINGS_ROUTE: &str = "/wp-json/wp/v2/kokoukset";
const PER_PAGE: u32 = 100;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops if the site keeps returning full pages.
const MAX_PAGES: usize = 100;

/// Client for the WordPress REST API, scoped to the meeting post type.
pub struct WordPressClient {
    client: Client,
    base_url: String,
}

impl WordPressClient {
    /// Creates a client with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`WordPressError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, WordPressError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetches one page of meetings. `Ok(None)` means the end of the listing:
    /// HTTP 400/404 or an empty page.
    ///
    /// # Errors
    ///
    /// - [`WordPressError::Http`] on network failure.
    /// - [`WordPressError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`WordPressError::Deserialize`] if the body is not a JSON array of
    ///   meeting posts.
    pub async fn fetch_meetings_page(
        &self,
        page: usize,
    ) -> Result<Option<Vec<WpMeeting>>, WordPressError> {
        let url = format!(
            "{}{MEETINGS_ROUTE}?per_page={PER_PAGE}&page={page}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(WordPressError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let items: Vec<WpMeeting> =
            serde_json::from_str(&body).map_err(|e| WordPressError::Deserialize {
                context: format!("meetings page {page}"),
                source: e,
            })?;

        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(items))
    }

    /// Fetches every meeting by walking pages until the listing ends.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_meetings_page`]. Returns
    /// [`WordPressError::PaginationLimit`] if the listing exceeds `MAX_PAGES`
    /// full pages.
    pub async fn fetch_all_meetings(&self) -> Result<Vec<WpMeeting>, WordPressError> {
        let mut all: Vec<WpMeeting> = Vec::new();
        let mut page = 1usize;

        loop {
            if page > MAX_PAGES {
                return Err(WordPressError::PaginationLimit {
                    base_url: self.base_url.clone(),
                    max_pages: MAX_PAGES,
                });
            }

            match self.fetch_meetings_page(page).await? {
                Some(items) => {
                    tracing::debug!(page, count = items.len(), "fetched meetings page");
                    all.extend(items);
                    page += 1;
                }
                None => break,
            }
        }

        Ok(all)
    }
}

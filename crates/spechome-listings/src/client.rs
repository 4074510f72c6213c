//! HTTP client for the listings API.
//!
//! Searches are expressed as Zillow search-page URLs (see
//! [`crate::search_url`]) which the API scrapes and returns as JSON pages.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use spechome_core::{
    AppConfig, ListingSource, PropertyDetails, RegionConfig, SearchFilters, SearchPage,
};

use crate::error::ListingsError;
use crate::retry::retry_with_backoff;
use crate::search_url::{build_search_url, encode_component};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "spechome/0.1 (teardown-analysis)";

/// Client for the RapidAPI listings scraper.
///
/// Use [`ListingsClient::new`] for production or
/// [`ListingsClient::with_base_url`] to point at a mock server in tests.
pub struct ListingsClient {
    client: Client,
    api_key: String,
    api_host: String,
    base_url: Url,
    region: RegionConfig,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl ListingsClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ListingsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ListingsError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn new(config: &AppConfig, region: RegionConfig) -> Result<Self, ListingsError> {
        let client = Self::build(
            &config.rapidapi_key,
            &config.listings_base_url,
            config.listings_timeout_secs,
            &config.listings_user_agent,
            region,
        )?;
        Ok(client.with_retry(
            config.listings_max_retries,
            config.listings_retry_backoff_base_secs,
        ))
    }

    /// Creates a client with a custom base URL and no retries (for testing
    /// with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`ListingsClient::new`].
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        region: RegionConfig,
    ) -> Result<Self, ListingsError> {
        Self::build(
            api_key,
            base_url,
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_USER_AGENT,
            region,
        )
    }

    /// Sets the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    fn build(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        region: RegionConfig,
    ) -> Result<Self, ListingsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ListingsError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let api_host = parsed
            .host_str()
            .ok_or_else(|| ListingsError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL has no host".to_owned(),
            })?
            .to_owned();

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            api_host,
            base_url: parsed,
            region,
            max_retries: 0,
            backoff_base_secs: 0,
        })
    }

    #[must_use]
    pub fn region(&self) -> &RegionConfig {
        &self.region
    }

    /// Fetches one page of search results.
    ///
    /// Failure payloads without a `results` array decode to an empty page;
    /// the upstream message is logged.
    ///
    /// # Errors
    ///
    /// - [`ListingsError::RateLimited`] on HTTP 429 after retries.
    /// - [`ListingsError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ListingsError::Http`] on network failure.
    /// - [`ListingsError::Deserialize`] if the body is not a JSON object.
    pub async fn search_page(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<SearchPage, ListingsError> {
        let search_url = build_search_url(&self.region, filters);
        let url = self.endpoint(&format!(
            "api/search/byurl?url={}&page={page}",
            encode_component(&search_url)
        ))?;
        tracing::debug!(page, sold_only = filters.sold_only, "listings search request");

        let result: SearchPage = self.get_json(&url, &format!("search page {page}")).await?;
        if result.success == Some(false) {
            tracing::warn!(
                page,
                message = result.message.as_deref().unwrap_or("none"),
                "listings API reported an unsuccessful search"
            );
        }
        Ok(result)
    }

    /// Fetches full details, including nearby schools, for one property.
    ///
    /// # Errors
    ///
    /// - [`ListingsError::Api`] if the API flags the lookup as failed.
    /// - Otherwise as [`ListingsClient::search_page`].
    pub async fn property(&self, zpid: &str) -> Result<PropertyDetails, ListingsError> {
        let url = self.endpoint(&format!("api/property?zpid={}", encode_component(zpid)))?;
        let body: serde_json::Value = self
            .get_json(&url, &format!("property(zpid={zpid})"))
            .await?;
        Self::check_api_error(&body)?;

        serde_json::from_value(body).map_err(|e| ListingsError::Deserialize {
            context: format!("property(zpid={zpid})"),
            source: e,
        })
    }

    fn endpoint(&self, path_and_query: &str) -> Result<Url, ListingsError> {
        self.base_url
            .join(path_and_query)
            .map_err(|e| ListingsError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends an authenticated GET with retries and parses the JSON body.
    async fn get_json<T>(&self, url: &Url, context: &str) -> Result<T, ListingsError>
    where
        T: DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self
                .client
                .get(url.clone())
                .header("x-rapidapi-host", &self.api_host)
                .header("x-rapidapi-key", &self.api_key)
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ListingsError::RateLimited { retry_after_secs });
            }

            if !status.is_success() {
                return Err(ListingsError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: redact_url(url),
                });
            }

            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| ListingsError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }

    /// Surfaces `{"success": false, "message": ...}` and `{"error": ...}`
    /// payloads as [`ListingsError::Api`].
    fn check_api_error(body: &serde_json::Value) -> Result<(), ListingsError> {
        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            let msg = err
                .as_str()
                .map_or_else(|| err.to_string(), str::to_owned);
            return Err(ListingsError::Api(msg));
        }
        if body.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            let msg = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ListingsError::Api(msg));
        }
        Ok(())
    }
}

/// Path only; the query carries the full search URL and is noise in errors.
fn redact_url(url: &Url) -> String {
    format!(
        "{}://{}{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.path()
    )
}

impl ListingSource for ListingsClient {
    type Error = ListingsError;

    fn search(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send {
        self.search_page(filters, page)
    }

    fn property_details(
        &self,
        zpid: &str,
    ) -> impl Future<Output = Result<PropertyDetails, Self::Error>> + Send {
        self.property(zpid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ListingsClient {
        ListingsClient::with_base_url("test-key", base_url, RegionConfig::oak_brook())
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = test_client("https://real-estate101.p.rapidapi.com/");
        let url = client.endpoint("api/property?zpid=42").expect("url");
        assert_eq!(
            url.as_str(),
            "https://real-estate101.p.rapidapi.com/api/property?zpid=42"
        );
    }

    #[test]
    fn api_host_comes_from_base_url() {
        let client = test_client("https://real-estate101.p.rapidapi.com");
        assert_eq!(client.api_host, "real-estate101.p.rapidapi.com");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ListingsClient::with_base_url("k", "not a url", RegionConfig::oak_brook());
        assert!(matches!(result, Err(ListingsError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn check_api_error_detects_failure_payloads() {
        let failed = serde_json::json!({ "success": false, "message": "Property not found" });
        assert!(
            matches!(ListingsClient::check_api_error(&failed), Err(ListingsError::Api(ref m)) if m == "Property not found")
        );
        let errored = serde_json::json!({ "error": "timeout" });
        assert!(matches!(
            ListingsClient::check_api_error(&errored),
            Err(ListingsError::Api(_))
        ));
        let ok = serde_json::json!({ "zpid": 1, "schools": [] });
        assert!(ListingsClient::check_api_error(&ok).is_ok());
    }

    #[test]
    fn redact_url_drops_query() {
        let url = Url::parse("https://host.test/api/search/byurl?url=abc&page=2").expect("url");
        assert_eq!(redact_url(&url), "https://host.test/api/search/byurl");
    }
}

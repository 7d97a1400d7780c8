// Flight supplier client: OAuth2 client-credentials exchange and flight-offers search
use crate::supplier::{SupplierSearchResponse, SupplierTokenResponse};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const TOKEN_PATH: &str = "/v1/security/oauth2/token";
pub const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
pub const DEFAULT_MAX_RESULTS: u32 = 25;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing AMADEUS_CLIENT_ID/AMADEUS_CLIENT_SECRET")]
    MissingCredentials,

    #[error("Amadeus auth failed: {body}")]
    AuthRejected { status_code: u16, body: String },

    #[error("Amadeus flight search failed: {body}")]
    SearchRejected { status_code: u16, body: String },

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid supplier response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    // Configuration problems are ours; everything else is the supplier's
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::MissingCredentials)
    }

    fn from_transport(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(timeout.as_millis() as u64)
        } else if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::NetworkError(e.to_string())
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    // Both halves must be present and non-empty; values are sent as given
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Some(Self {
                    client_id,
                    client_secret,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub ttl_seconds: u64,
}

impl From<SupplierTokenResponse> for AccessToken {
    fn from(item: SupplierTokenResponse) -> Self {
        let ttl_seconds = item.ttl_seconds();
        Self {
            token: item.access_token,
            ttl_seconds,
        }
    }
}

// Query string for the flight-offers call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferQuery {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: String,
    pub adults: u32,
    pub currency_code: String,
    pub non_stop: &'static str,
    pub max: u32,
}

#[async_trait]
pub trait ProviderClient: Send + Sync + 'static {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, ProviderError>;

    // Raw offer records, undecoded
    async fn search_offers(&self, token: &str, query: &OfferQuery)
        -> Result<Vec<Value>, ProviderError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderEnvironment {
    #[default]
    Test,
    Prod,
}

impl ProviderEnvironment {
    // Anything other than "prod" selects the test environment
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "prod" => ProviderEnvironment::Prod,
            _ => ProviderEnvironment::Test,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEnvironment::Test => "test",
            ProviderEnvironment::Prod => "prod",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            ProviderEnvironment::Test => "https://test.api.amadeus.com",
            ProviderEnvironment::Prod => "https://api.amadeus.com",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_timeout_ms: u64,
    pub search_timeout_ms: u64,
}

impl ClientConfig {
    pub fn for_environment(environment: ProviderEnvironment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ProviderEnvironment::Test.base_url().to_string(),
            auth_timeout_ms: 20_000,
            search_timeout_ms: 25_000,
        }
    }
}

pub struct AmadeusClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AmadeusClient {
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;
        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

// Rejection bodies are passed through as the error detail
async fn read_error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read supplier error body");
            String::new()
        }
    }
}

#[async_trait]
impl ProviderClient for AmadeusClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, ProviderError> {
        let timeout = Duration::from_millis(self.config.auth_timeout_ms);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .timeout(timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            tracing::warn!(status = status.as_u16(), "Supplier rejected token exchange");
            return Err(ProviderError::AuthRejected {
                status_code: status.as_u16(),
                body,
            });
        }

        let payload: SupplierTokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_transport(e, timeout))?;

        Ok(payload.into())
    }

    async fn search_offers(
        &self,
        token: &str,
        query: &OfferQuery,
    ) -> Result<Vec<Value>, ProviderError> {
        let timeout = Duration::from_millis(self.config.search_timeout_ms);

        let response = self
            .http
            .get(self.url(FLIGHT_OFFERS_PATH))
            .timeout(timeout)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            tracing::warn!(status = status.as_u16(), "Supplier rejected flight search");
            return Err(ProviderError::SearchRejected {
                status_code: status.as_u16(),
                body,
            });
        }

        let payload: SupplierSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_transport(e, timeout))?;

        Ok(payload.into_offers())
    }
}

// Scriptable in-memory supplier for tests
#[cfg(test)]
pub mod mock_provider {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub struct MockProvider {
        auth_calls: AtomicUsize,
        search_calls: AtomicUsize,
        ttl_seconds: u64,
        auth_failure: Mutex<Option<(u16, String)>>,
        search_failure: Mutex<Option<(u16, String)>>,
        offers: Mutex<Vec<Value>>,
        last_token: Mutex<Option<String>>,
        last_query: Mutex<Option<OfferQuery>>,
        auth_delay_ms: u64,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::with_ttl(1799)
        }

        pub fn with_ttl(ttl_seconds: u64) -> Self {
            Self {
                auth_calls: AtomicUsize::new(0),
                search_calls: AtomicUsize::new(0),
                ttl_seconds,
                auth_failure: Mutex::new(None),
                search_failure: Mutex::new(None),
                offers: Mutex::new(Vec::new()),
                last_token: Mutex::new(None),
                last_query: Mutex::new(None),
                auth_delay_ms: 0,
            }
        }

        pub fn with_auth_delay(mut self, delay_ms: u64) -> Self {
            self.auth_delay_ms = delay_ms;
            self
        }

        pub fn set_offers(&self, offers: Vec<Value>) {
            *self.offers.lock().unwrap() = offers;
        }

        pub fn fail_auth(&self, status_code: u16, body: &str) {
            *self.auth_failure.lock().unwrap() = Some((status_code, body.to_string()));
        }

        pub fn fail_search(&self, status_code: u16, body: &str) {
            *self.search_failure.lock().unwrap() = Some((status_code, body.to_string()));
        }

        pub fn auth_calls(&self) -> usize {
            self.auth_calls.load(Ordering::SeqCst)
        }

        pub fn search_calls(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }

        pub fn last_token(&self) -> Option<String> {
            self.last_token.lock().unwrap().clone()
        }

        pub fn last_query(&self) -> Option<OfferQuery> {
            self.last_query.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProviderClient for MockProvider {
        async fn authenticate(
            &self,
            _credentials: &Credentials,
        ) -> Result<AccessToken, ProviderError> {
            let call = self.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;

            if self.auth_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.auth_delay_ms)).await;
            }

            if let Some((status_code, body)) = self.auth_failure.lock().unwrap().clone() {
                return Err(ProviderError::AuthRejected { status_code, body });
            }

            Ok(AccessToken {
                token: format!("token-{}", call),
                ttl_seconds: self.ttl_seconds,
            })
        }

        async fn search_offers(
            &self,
            token: &str,
            query: &OfferQuery,
        ) -> Result<Vec<Value>, ProviderError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().unwrap() = Some(token.to_string());
            *self.last_query.lock().unwrap() = Some(query.clone());

            if let Some((status_code, body)) = self.search_failure.lock().unwrap().clone() {
                return Err(ProviderError::SearchRejected { status_code, body });
            }

            Ok(self.offers.lock().unwrap().clone())
        }
    }
}

// Flight search orchestration: validate -> token -> supplier search -> normalize -> sort
use crate::normalizer::{sort_by_price, NormalizedOffer, OfferNormalizer};
use crate::provider::{OfferQuery, ProviderClient, ProviderError, DEFAULT_MAX_RESULTS};
use crate::token_cache::TokenCache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const MIN_PASSENGERS: u32 = 1;
pub const MAX_PASSENGERS: u32 = 9;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search request: {0}")]
    Validation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub date: String,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub non_stop: bool,
}

fn default_passengers() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

impl SearchRequest {
    // Shape checks only: codes and dates are passed to the supplier as given
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&self.passengers) {
            return Err(SearchError::Validation(format!(
                "passengers must be between {} and {}, got {}",
                MIN_PASSENGERS, MAX_PASSENGERS, self.passengers
            )));
        }
        if self.origin.chars().count() < 3 {
            return Err(SearchError::Validation(
                "origin must be at least 3 characters".to_string(),
            ));
        }
        if self.destination.chars().count() < 3 {
            return Err(SearchError::Validation(
                "destination must be at least 3 characters".to_string(),
            ));
        }
        if self.date.chars().count() < 8 {
            return Err(SearchError::Validation(
                "date must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_query(&self, max: u32) -> OfferQuery {
        OfferQuery {
            origin_location_code: self.origin.to_uppercase(),
            destination_location_code: self.destination.to_uppercase(),
            departure_date: self.date.clone(),
            adults: self.passengers,
            currency_code: self.currency.to_uppercase(),
            non_stop: if self.non_stop { "true" } else { "false" },
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResponse {
    pub offers: Vec<NormalizedOffer>,
}

pub struct SearchService {
    provider: Arc<dyn ProviderClient>,
    tokens: TokenCache,
    normalizer: OfferNormalizer,
    max_results: u32,
}

impl SearchService {
    pub fn new(provider: Arc<dyn ProviderClient>, tokens: TokenCache) -> Self {
        Self {
            provider,
            tokens,
            normalizer: OfferNormalizer::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        request.validate()?;

        let token = self.tokens.get_token(self.provider.as_ref()).await?;
        let query = request.to_query(self.max_results);

        let raw_offers = self.provider.search_offers(&token, &query).await?;
        let received = raw_offers.len();

        let batch = self.normalizer.normalize_batch(raw_offers);
        let mut offers = batch.offers;
        sort_by_price(&mut offers);

        tracing::info!(
            origin = %query.origin_location_code,
            destination = %query.destination_location_code,
            date = %query.departure_date,
            received,
            returned = offers.len(),
            dropped = batch.dropped.len(),
            "Flight search completed"
        );

        Ok(SearchResponse { offers })
    }
}

// Flight search proxy: supplier OAuth token caching, offer search and normalization

pub mod api;
pub mod config;
pub mod normalizer;
pub mod provider;
pub mod search;
pub mod supplier;
pub mod token_cache;

// Re-export key types for convenience
pub use api::{app, AppError, AppState};
pub use config::{AppConfig, ConfigError};
pub use normalizer::{NormalizeError, NormalizedBatch, NormalizedOffer, OfferNormalizer};
pub use provider::{
    AccessToken, AmadeusClient, ClientConfig, Credentials, OfferQuery, ProviderClient,
    ProviderEnvironment, ProviderError,
};
pub use search::{SearchError, SearchRequest, SearchResponse, SearchService};
pub use supplier::{RawOffer, SupplierSearchResponse, SupplierTokenResponse};
pub use token_cache::{CachedToken, TokenCache, TokenCacheStats};

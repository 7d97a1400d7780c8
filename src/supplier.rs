use serde::{Deserialize, Serialize};
use serde_json::Value;

// Envelope of the supplier's flight-offers search response.
// Records stay as raw JSON so each one can be decoded on its own.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierSearchResponse {
    pub data: Option<Vec<Value>>,
}

impl SupplierSearchResponse {
    pub fn into_offers(self) -> Vec<Value> {
        self.data.unwrap_or_default()
    }
}

// Data structures for a single supplier flight offer.
// Every field is optional: the supplier schema differs between fare types.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawOffer {
    pub id: Option<String>,
    pub itineraries: Option<Vec<RawItinerary>>,
    pub price: Option<RawPrice>,
    pub validating_airline_codes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItinerary {
    pub duration: Option<String>,
    pub segments: Option<Vec<RawSegment>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSegment {
    pub departure: Option<RawEndpoint>,
    pub arrival: Option<RawEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEndpoint {
    pub at: Option<String>,
}

// grandTotal is documented as a decimal string but some fare types send a number
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPrice {
    pub grand_total: Option<Value>,
}

// Token endpoint payload. expires_in arrives as a number or a numeric string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupplierTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<Value>,
}

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 900;

impl SupplierTokenResponse {
    // Null, missing or unreadable lifetimes fall back to 15 minutes
    pub fn ttl_seconds(&self) -> u64 {
        self.expires_in
            .as_ref()
            .and_then(parse_seconds)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS)
    }
}

fn parse_seconds(value: &Value) -> Option<u64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds as u64)
    } else {
        None
    }
}

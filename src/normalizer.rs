// Offer normalization: supplier flight offers -> stable frontend schema
use crate::supplier::{RawOffer, RawPrice};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const FALLBACK_CARRIER: &str = "AIRLINE";
pub const ZERO_DURATION: &str = "PT0M";

// Reasons an offer is dropped from a search result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Malformed offer record: {0}")]
    Malformed(String),

    #[error("Offer has no itineraries")]
    NoItineraries,

    #[error("First itinerary has no segments")]
    NoSegments,

    #[error("Missing {0} timestamp")]
    MissingTimestamp(&'static str),

    #[error("Missing price.grandTotal")]
    MissingPrice,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NormalizedOffer {
    pub id: String,
    pub carrier: String,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub price: f64,
    pub direct: bool,
    // The supplier does not report seats reliably for this call
    pub seats: Option<u32>,
}

// Result of normalizing a whole supplier page
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub offers: Vec<NormalizedOffer>,
    pub dropped: Vec<(usize, NormalizeError)>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OfferNormalizer;

impl OfferNormalizer {
    pub fn new() -> Self {
        Self
    }

    // Decode one raw JSON record and normalize it
    pub fn normalize_value(&self, value: Value) -> Result<NormalizedOffer, NormalizeError> {
        let raw: RawOffer = serde_json::from_value(value)
            .map_err(|e| NormalizeError::Malformed(e.to_string()))?;
        self.normalize(&raw)
    }

    // One-way view: only the first itinerary is considered
    pub fn normalize(&self, raw: &RawOffer) -> Result<NormalizedOffer, NormalizeError> {
        let itinerary = raw
            .itineraries
            .as_deref()
            .and_then(<[_]>::first)
            .ok_or(NormalizeError::NoItineraries)?;

        let segments = itinerary
            .segments
            .as_deref()
            .filter(|segments| !segments.is_empty())
            .ok_or(NormalizeError::NoSegments)?;

        let departure = segments
            .first()
            .and_then(|s| s.departure.as_ref())
            .and_then(|d| d.at.as_deref())
            .filter(|at| !at.is_empty())
            .ok_or(NormalizeError::MissingTimestamp("departure"))?;

        let arrival = segments
            .last()
            .and_then(|s| s.arrival.as_ref())
            .and_then(|a| a.at.as_deref())
            .filter(|at| !at.is_empty())
            .ok_or(NormalizeError::MissingTimestamp("arrival"))?;

        let price = parse_grand_total(raw.price.as_ref())?;

        Ok(NormalizedOffer {
            id: raw.id.clone().unwrap_or_default(),
            carrier: pick_carrier(raw),
            departure: display_timestamp(departure),
            arrival: display_timestamp(arrival),
            duration: itinerary
                .duration
                .clone()
                .unwrap_or_else(|| ZERO_DURATION.to_string()),
            price,
            direct: segments.len() == 1,
            seats: None,
        })
    }

    // Normalize every record independently, keeping drop reasons by index
    pub fn normalize_batch(&self, values: Vec<Value>) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();

        for (index, value) in values.into_iter().enumerate() {
            match self.normalize_value(value) {
                Ok(offer) => batch.offers.push(offer),
                Err(e) => {
                    tracing::debug!(index, error = %e, "Dropping supplier offer");
                    batch.dropped.push((index, e));
                }
            }
        }

        batch
    }
}

pub fn pick_carrier(raw: &RawOffer) -> String {
    raw.validating_airline_codes
        .as_ref()
        .and_then(|codes| codes.first())
        .cloned()
        .unwrap_or_else(|| FALLBACK_CARRIER.to_string())
}

// "2024-06-01T10:30:00" -> "2024-06-01 10:30:00", no timezone handling
pub fn display_timestamp(iso: &str) -> String {
    iso.replacen('T', " ", 1)
}

fn parse_grand_total(price: Option<&RawPrice>) -> Result<f64, NormalizeError> {
    let total = price
        .and_then(|p| p.grand_total.as_ref())
        .ok_or(NormalizeError::MissingPrice)?;

    let amount = match total {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| NormalizeError::InvalidPrice(s.clone()))?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| NormalizeError::InvalidPrice(n.to_string()))?,
        other => return Err(NormalizeError::InvalidPrice(other.to_string())),
    };

    if !amount.is_finite() {
        return Err(NormalizeError::InvalidPrice(total.to_string()));
    }

    Ok(amount)
}

// Cheapest first. Ties keep no particular order.
pub fn sort_by_price(offers: &mut [NormalizedOffer]) {
    offers.sort_unstable_by(|a, b| a.price.total_cmp(&b.price));
}

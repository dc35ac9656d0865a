//! Data models
//!
//! Plain serde types shared by the store, the fetch service and the gateway.

mod paper;
mod rating;

pub use paper::{Enrichment, Paper};
pub use rating::{RatingRecord, Sentiment, DEFAULT_RATING, MAX_RATING, MIN_RATING};

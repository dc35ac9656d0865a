//! Paper rating store
//!
//! One rating per paper, kept in memory and written through to a durable
//! slot after every change. The store is an explicit object: build it once
//! at startup with [`RatingStore::load`] and hand it to whoever needs it.

use crate::errors::{AppError, Result, StoreLoadError};
use crate::metrics;
use crate::models::{RatingRecord, DEFAULT_RATING, MAX_RATING, MIN_RATING};
use crate::storage::DurableSlot;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default slot key holding the serialized rating array
pub const DEFAULT_RATINGS_KEY: &str = "paperRatings";

pub struct RatingStore {
    slot: Arc<dyn DurableSlot>,
    key: String,
    records: Vec<RatingRecord>,
}

impl RatingStore {
    /// Rehydrate the store from `slot`.
    ///
    /// Unreadable or malformed slot contents are logged and the store starts
    /// empty; loading never fails.
    pub fn load(slot: Arc<dyn DurableSlot>, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = match Self::read_records(slot.as_ref(), &key) {
            Ok(records) => {
                info!(key = %key, count = records.len(), "Loaded paper ratings");
                records
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable rating data, starting empty");
                metrics::record_store_load_fallback();
                Vec::new()
            }
        };

        metrics::set_ratings_stored(records.len());
        Self { slot, key, records }
    }

    fn read_records(
        slot: &dyn DurableSlot,
        key: &str,
    ) -> std::result::Result<Vec<RatingRecord>, StoreLoadError> {
        let raw = slot.get(key).map_err(|e| StoreLoadError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        let parsed: Vec<RatingRecord> =
            serde_json::from_str(&raw).map_err(|source| StoreLoadError::Malformed {
                key: key.to_string(),
                source,
            })?;

        // Collapse duplicates, the last occurrence wins
        let mut records: Vec<RatingRecord> = Vec::with_capacity(parsed.len());
        for record in parsed {
            match records.iter_mut().find(|r| r.paper_id == record.paper_id) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }
        Ok(records)
    }

    /// Stored rating for `paper_id`, or [`DEFAULT_RATING`] when unrated.
    pub fn get_rating(&self, paper_id: &str) -> u8 {
        self.get_record(paper_id)
            .map(|r| r.rating)
            .unwrap_or(DEFAULT_RATING)
    }

    pub fn get_record(&self, paper_id: &str) -> Option<&RatingRecord> {
        self.records.iter().find(|r| r.paper_id == paper_id)
    }

    /// Insert or overwrite the rating for `paper_id` and persist the full set.
    ///
    /// Ratings outside 1..=5 are rejected and leave the store untouched.
    pub fn update_rating(&mut self, paper_id: &str, rating: u8) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::InvalidRating {
                rating: rating.into(),
            });
        }

        let now = Utc::now();
        let mut records = self.records.clone();
        match records.iter_mut().find(|r| r.paper_id == paper_id) {
            Some(existing) => {
                existing.rating = rating;
                existing.timestamp = now;
            }
            None => records.push(RatingRecord {
                paper_id: paper_id.to_string(),
                rating,
                timestamp: now,
            }),
        }

        // Memory only changes once the slot accepted the new set
        self.persist(&records)?;
        self.records = records;

        metrics::record_rating_update(rating);
        metrics::set_ratings_stored(self.records.len());
        debug!(paper_id = %paper_id, rating, "Rating updated");
        Ok(())
    }

    /// Every stored record. Order is not significant.
    pub fn get_all_ratings(&self) -> Vec<RatingRecord> {
        self.records.clone()
    }

    /// Drop all ratings and remove the durable slot entirely.
    pub fn clear_ratings(&mut self) -> Result<()> {
        let existed = self.slot.remove(&self.key)?;
        self.records.clear();
        metrics::set_ratings_stored(0);
        info!(key = %self.key, existed, "Ratings cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check that the backing slot answers reads.
    pub fn probe(&self) -> Result<bool> {
        self.slot.contains(&self.key)
    }

    fn persist(&self, records: &[RatingRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.slot.set(&self.key, &json)
    }
}

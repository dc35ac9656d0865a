//! Rating record and sentiment levels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rating shown for a paper that was never rated.
pub const DEFAULT_RATING: u8 = 3;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One user rating, at most one per paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub paper_id: String,
    pub rating: u8,
    pub timestamp: DateTime<Utc>,
}

impl RatingRecord {
    pub fn new(paper_id: impl Into<String>, rating: u8) -> Self {
        Self {
            paper_id: paper_id.into(),
            rating,
            timestamp: Utc::now(),
        }
    }
}

/// The five levels of the sentiment-icon rating control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    VeryDissatisfied = 1,
    Dissatisfied = 2,
    Neutral = 3,
    Satisfied = 4,
    VerySatisfied = 5,
}

impl Sentiment {
    pub fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            1 => Some(Sentiment::VeryDissatisfied),
            2 => Some(Sentiment::Dissatisfied),
            3 => Some(Sentiment::Neutral),
            4 => Some(Sentiment::Satisfied),
            5 => Some(Sentiment::VerySatisfied),
            _ => None,
        }
    }

    pub fn rating(self) -> u8 {
        self as u8
    }

    /// Accessible label of the icon
    pub fn label(self) -> &'static str {
        match self {
            Sentiment::VeryDissatisfied => "Very Dissatisfied",
            Sentiment::Dissatisfied => "Dissatisfied",
            Sentiment::Neutral => "Neutral",
            Sentiment::Satisfied => "Satisfied",
            Sentiment::VerySatisfied => "Very Satisfied",
        }
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::candidate::RankedCandidate;

/// A document that was uploaded but could not be turned into a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub message: String,
}

/// One stored ranking result, addressed by `id`.
#[derive(Debug, Clone)]
pub struct RankingSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Sorted by score descending; ties keep upload order.
    pub ranked: Vec<RankedCandidate>,
    pub failures: Vec<DocumentFailure>,
}

impl RankingSession {
    pub fn new(ranked: Vec<RankedCandidate>, failures: Vec<DocumentFailure>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            ranked,
            failures,
        }
    }
}

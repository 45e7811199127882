use crate::extraction::entities::Entities;

/// One uploaded résumé after extraction. Immutable once built.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub filename: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub raw_text: String,
}

impl Candidate {
    /// Builds a candidate from its text, keeping the first name and first email found.
    pub fn from_entities(filename: impl Into<String>, raw_text: String, entities: Entities) -> Self {
        let Entities { emails, names } = entities;
        Self {
            filename: filename.into(),
            name: names.into_iter().next(),
            email: emails.into_iter().next(),
            raw_text,
        }
    }
}

/// A candidate with its similarity score (0 – 100).
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub filename: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub score: f64,
}

impl RankedCandidate {
    pub fn new(candidate: Candidate, score: f64) -> Self {
        Self {
            filename: candidate.filename,
            name: candidate.name,
            email: candidate.email,
            score,
        }
    }
}

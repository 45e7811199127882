// Similarity ranking: TF-IDF vector space + cosine scoring of résumés against a job description.
// Vectorization is CPU-bound; callers on the async side run it inside tokio::task::spawn_blocking.

pub mod ranker;
pub mod tfidf;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use ranker::SimilarityRanker;

/// Which documents the TF-IDF vocabulary is fitted on.
///
/// `Reference` fits on the job description alone, so any term that only appears in
/// résumés carries zero weight. `Corpus` fits on the job description plus every résumé.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VocabularyScope {
    #[default]
    Reference,
    Corpus,
}

#[derive(Debug, Error)]
#[error("unknown vocabulary scope '{0}' (expected 'reference' or 'corpus')")]
pub struct ParseScopeError(String);

impl FromStr for VocabularyScope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" => Ok(VocabularyScope::Reference),
            "corpus" => Ok(VocabularyScope::Corpus),
            other => Err(ParseScopeError(other.to_string())),
        }
    }
}

impl fmt::Display for VocabularyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularyScope::Reference => f.write_str("reference"),
            VocabularyScope::Corpus => f.write_str("corpus"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorizationError {
    #[error("empty vocabulary: the job description contains no usable terms")]
    EmptyVocabulary,
}

//! Similarity Ranker: scores candidate texts against a job description and orders them.
//!
//! Algorithm:
//! 1. Fit a TF-IDF space (job description only, or job description + résumés
//!    depending on `VocabularyScope`).
//! 2. Transform the job description and every résumé into that space.
//! 3. score = cosine(job, résumé) × 100, clamped to [0, 100].
//! 4. Sort descending by score. The sort is stable, so ties keep upload order.

use crate::models::candidate::{Candidate, RankedCandidate};
use crate::ranking::tfidf::TfidfVectorizer;
use crate::ranking::{VectorizationError, VocabularyScope};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker {
    scope: VocabularyScope,
}

impl SimilarityRanker {
    pub fn new(scope: VocabularyScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> VocabularyScope {
        self.scope
    }

    /// One score per candidate text, in input order.
    pub fn score<S: AsRef<str>>(
        &self,
        reference: &str,
        candidates: &[S],
    ) -> Result<Vec<f64>, VectorizationError> {
        let vectorizer = match self.scope {
            VocabularyScope::Reference => TfidfVectorizer::fit(&[reference])?,
            VocabularyScope::Corpus => {
                let mut corpus: Vec<&str> = Vec::with_capacity(candidates.len() + 1);
                corpus.push(reference);
                corpus.extend(candidates.iter().map(|text| text.as_ref()));
                TfidfVectorizer::fit(&corpus)?
            }
        };

        // Corpus fits can succeed on résumé vocabulary alone; an empty job description
        // is still degenerate.
        let reference_vector = vectorizer.transform(reference);
        if reference_vector.is_zero() {
            return Err(VectorizationError::EmptyVocabulary);
        }

        Ok(candidates
            .iter()
            .map(|text| {
                let similarity = reference_vector.cosine(&vectorizer.transform(text.as_ref()));
                (similarity * 100.0).clamp(0.0, 100.0)
            })
            .collect())
    }

    /// Scores and sorts `candidates`. Returns exactly one entry per candidate.
    pub fn rank(
        &self,
        reference: &str,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<RankedCandidate>, VectorizationError> {
        let texts: Vec<&str> = candidates.iter().map(|c| c.raw_text.as_str()).collect();
        let scores = self.score(reference, &texts)?;

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| RankedCandidate::new(candidate, score))
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}

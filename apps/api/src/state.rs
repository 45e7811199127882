use std::sync::Arc;

use crate::config::Config;
use crate::extraction::{DocumentTextExtractor, EntityExtractor, RegexEntityExtractor, TextExtractor};
use crate::ranking::SimilarityRanker;
use crate::screening::session::{InMemorySessionStore, SessionStore};
use crate::screening::storage::{DiskDocumentStore, DocumentStore, InMemoryDocumentStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable text extractor. Default: DocumentTextExtractor (PDF + plain text).
    pub text_extractor: Arc<dyn TextExtractor>,
    /// Pluggable entity extractor. Default: RegexEntityExtractor.
    pub entity_extractor: Arc<dyn EntityExtractor>,
    pub ranker: SimilarityRanker,
    /// Working location for uploads. On disk when UPLOAD_DIR is set, in memory otherwise.
    pub documents: Arc<dyn DocumentStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let documents: Arc<dyn DocumentStore> = match &config.upload_dir {
            Some(dir) => Arc::new(DiskDocumentStore::new(dir.clone())),
            None => Arc::new(InMemoryDocumentStore::new()),
        };

        Self {
            text_extractor: Arc::new(DocumentTextExtractor),
            entity_extractor: Arc::new(RegexEntityExtractor::new()),
            ranker: SimilarityRanker::new(config.vocabulary_scope),
            documents,
            sessions: Arc::new(InMemorySessionStore::new(config.session_capacity)),
            config,
        }
    }
}

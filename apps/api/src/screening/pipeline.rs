//! Ranking pipeline: one request from uploads to a stored `RankingSession`.
//!
//! 1. Validate document count.
//! 2. Per document: save → load and remove → extract text → extract entities → `Candidate`.
//!    A document that fails extraction becomes a `DocumentFailure`; the rest continue.
//!    The stored copy is gone before extraction starts, so a request cut short by its
//!    timeout leaves nothing behind.
//! 3. Rank all candidates against the job description (blocking pool).
//! 4. Store the session and hand it back to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::candidate::Candidate;
use crate::models::session::{DocumentFailure, RankingSession};
use crate::screening::storage::DocumentStore;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub job_description: String,
    pub uploads: Vec<Upload>,
}

pub async fn run_ranking(
    state: &AppState,
    request: RankingRequest,
) -> Result<Arc<RankingSession>, AppError> {
    let RankingRequest {
        job_description,
        uploads,
    } = request;

    if uploads.is_empty() {
        return Err(AppError::Validation(
            "at least one résumé file is required".to_string(),
        ));
    }
    if uploads.len() > state.config.max_documents {
        return Err(AppError::Validation(format!(
            "too many files: {} uploaded, at most {} allowed",
            uploads.len(),
            state.config.max_documents
        )));
    }

    let total = uploads.len();
    let mut candidates = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for upload in uploads {
        let filename = upload.filename.clone();
        match process_document(state, upload).await {
            Ok(candidate) => candidates.push(candidate),
            Err(AppError::Extraction(e)) => {
                warn!("Skipping '{filename}': {e}");
                failures.push(DocumentFailure {
                    filename,
                    message: e.to_string(),
                });
            }
            Err(other) => return Err(other),
        }
    }

    if candidates.is_empty() {
        let reasons: Vec<String> = failures.iter().map(|f| f.message.clone()).collect();
        return Err(AppError::UnprocessableEntity(format!(
            "none of the uploaded documents could be read: {}",
            reasons.join("; ")
        )));
    }

    let ranker = state.ranker;
    let ranked = tokio::task::spawn_blocking(move || ranker.rank(&job_description, candidates))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in ranking: {e}")))??;

    let session = Arc::new(RankingSession::new(ranked, failures));
    state.sessions.insert(session.clone()).await;

    info!(
        "Ranked {} of {} documents (scope: {}) into session {}",
        session.ranked.len(),
        total,
        ranker.scope(),
        session.id
    );

    Ok(session)
}

async fn process_document(state: &AppState, upload: Upload) -> Result<Candidate, AppError> {
    let Upload { filename, bytes } = upload;

    let stored = StoredUpload::save(state.documents.clone(), &filename, bytes).await?;
    let bytes = stored.take().await?;

    let raw_text = extract_text(state.text_extractor.clone(), filename.clone(), bytes).await?;
    let entities = state.entity_extractor.extract(&raw_text);
    debug!(
        "'{filename}': {} chars, {} email(s), {} name(s)",
        raw_text.len(),
        entities.emails.len(),
        entities.names.len()
    );

    Ok(Candidate::from_entities(filename, raw_text, entities))
}

/// An upload sitting in the document store. Dropped before `take` completes, it
/// removes the stored copy from a background task.
struct StoredUpload {
    documents: Arc<dyn DocumentStore>,
    key: String,
    pending: bool,
}

impl StoredUpload {
    async fn save(
        documents: Arc<dyn DocumentStore>,
        filename: &str,
        bytes: Bytes,
    ) -> anyhow::Result<Self> {
        let key = documents.save(filename, bytes).await?;
        Ok(Self {
            documents,
            key,
            pending: true,
        })
    }

    /// Reads the upload back and removes the stored copy.
    async fn take(mut self) -> anyhow::Result<Bytes> {
        let loaded = self.documents.load(&self.key).await;
        if let Err(e) = self.documents.remove(&self.key).await {
            warn!("Failed to remove stored upload {}: {e:#}", self.key);
        }
        self.pending = false;
        loaded
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if !self.pending {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime to remove stored upload {}", self.key);
            return;
        };
        let documents = self.documents.clone();
        let key = std::mem::take(&mut self.key);
        handle.spawn(async move {
            if let Err(e) = documents.remove(&key).await {
                warn!("Failed to remove abandoned upload {key}: {e:#}");
            }
        });
    }
}

/// Bounds `fut` by `limit`, mapping expiry to `AppError::Timeout`.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AppError::Timeout(limit.as_secs()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::extraction::{ExtractionError, TextExtractor};
    use crate::ranking::{VectorizationError, VocabularyScope};
    use crate::screening::storage::InMemoryDocumentStore;

    const JD: &str = "Looking for a Python developer with Flask experience";

    fn upload(filename: &str, text: &str) -> Upload {
        Upload {
            filename: filename.to_string(),
            bytes: Bytes::from(text.to_string()),
        }
    }

    fn request(job: &str, uploads: Vec<Upload>) -> RankingRequest {
        RankingRequest {
            job_description: job.to_string(),
            uploads,
        }
    }

    #[tokio::test]
    async fn test_ranks_every_document_sorted_and_in_range() {
        let state = AppState::from_config(Config::default());
        let uploads = vec![
            upload("java.txt", "Jane Doe\njane@doe.dev\nJava backend engineer"),
            upload("python.txt", "John Smith\njohn.smith@example.com\nPython and Flask developer"),
            upload("mixed.txt", "Flask tinkerer, mostly Go"),
        ];

        let session = run_ranking(&state, request(JD, uploads)).await.unwrap();

        assert_eq!(session.ranked.len(), 3);
        assert!(session.failures.is_empty());
        assert!(session.ranked.iter().all(|r| (0.0..=100.0).contains(&r.score)));
        assert!(session.ranked.windows(2).all(|w| w[0].score >= w[1].score));

        let top = &session.ranked[0];
        assert_eq!(top.filename, "python.txt");
        assert_eq!(top.name.as_deref(), Some("John Smith"));
        assert_eq!(top.email.as_deref(), Some("john.smith@example.com"));
    }

    #[tokio::test]
    async fn test_session_is_stored_as_latest() {
        let state = AppState::from_config(Config::default());
        let session = run_ranking(&state, request(JD, vec![upload("a.txt", "Python")]))
            .await
            .unwrap();
        assert_eq!(state.sessions.latest().await.unwrap().id, session.id);
        assert!(state.sessions.get(session.id).await.is_some());
    }

    #[tokio::test]
    async fn test_same_request_twice_gives_same_ranking() {
        let state = AppState::from_config(Config::default());
        let build = || {
            request(
                JD,
                vec![
                    upload("a.txt", "Flask developer"),
                    upload("b.txt", "Python developer with Flask experience"),
                    upload("c.txt", "Rust"),
                ],
            )
        };
        let first = run_ranking(&state, build()).await.unwrap();
        let second = run_ranking(&state, build()).await.unwrap();
        assert_eq!(first.ranked, second.ranked);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_unreadable_document_is_isolated() {
        let state = AppState::from_config(Config::default());
        let uploads = vec![
            upload("photo.png", "not text"),
            upload("cv.txt", "Python developer"),
        ];
        let session = run_ranking(&state, request(JD, uploads)).await.unwrap();
        assert_eq!(session.ranked.len(), 1);
        assert_eq!(session.failures.len(), 1);
        assert_eq!(session.failures[0].filename, "photo.png");
    }

    #[tokio::test]
    async fn test_all_documents_unreadable() {
        let state = AppState::from_config(Config::default());
        let err = run_ranking(&state, request(JD, vec![upload("a.docx", "x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert!(state.sessions.latest().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_job_description_is_vectorization_error() {
        let state = AppState::from_config(Config::default());
        let err = run_ranking(&state, request("", vec![upload("a.txt", "Python")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Vectorization(VectorizationError::EmptyVocabulary)
        ));
    }

    #[tokio::test]
    async fn test_no_uploads_rejected() {
        let state = AppState::from_config(Config::default());
        let err = run_ranking(&state, request(JD, vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_document_limit() {
        let config = Config {
            max_documents: 1,
            ..Config::default()
        };
        let state = AppState::from_config(config);
        let err = run_ranking(
            &state,
            request(JD, vec![upload("a.txt", "a"), upload("b.txt", "b")]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_uploads_are_removed_after_processing() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mut state = AppState::from_config(Config::default());
        state.documents = store.clone();

        run_ranking(
            &state,
            request(JD, vec![upload("a.txt", "Python"), upload("b.bin", "??")]),
        )
        .await
        .unwrap();
        assert_eq!(store.len().await, 0);
    }

    struct SlowExtractor;

    impl TextExtractor for SlowExtractor {
        fn extract(&self, _filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    #[tokio::test]
    async fn test_timed_out_request_leaves_no_stored_uploads() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mut state = AppState::from_config(Config::default());
        state.documents = store.clone();
        state.text_extractor = Arc::new(SlowExtractor);

        let err = with_timeout(
            Duration::from_millis(100),
            run_ranking(&state, request(JD, vec![upload("a.txt", "Python developer")])),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
        assert_eq!(store.len().await, 0);
        assert!(state.sessions.latest().await.is_none());
    }

    #[tokio::test]
    async fn test_abandoned_upload_is_removed_on_drop() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let stored = StoredUpload::save(store.clone(), "cv.txt", Bytes::from_static(b"Python"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);

        drop(stored);
        for _ in 0..10 {
            if store.len().await == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_disk_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            upload_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let state = AppState::from_config(config);
        let session = run_ranking(
            &state,
            request(JD, vec![upload("../cv.txt", "Python Flask developer")]),
        )
        .await
        .unwrap();
        assert_eq!(session.ranked.len(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corpus_scope_from_config() {
        let config = Config {
            vocabulary_scope: VocabularyScope::Corpus,
            ..Config::default()
        };
        let state = AppState::from_config(config);
        let session = run_ranking(
            &state,
            request(
                JD,
                vec![
                    upload("java.txt", "Java backend engineer"),
                    upload("python.txt", "Experienced Python and Flask developer"),
                ],
            ),
        )
        .await
        .unwrap();
        assert_eq!(session.ranked[0].filename, "python.txt");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let err = with_timeout(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through() {
        let value = with_timeout(Duration::from_secs(1), async { Ok::<_, AppError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}

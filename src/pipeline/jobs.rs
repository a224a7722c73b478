//! Feature jobs: compute and persist normalized text, then embeddings

use crate::error::{RecommenderError, Result};
use crate::input::{build_candidate_text, build_posting_text, extract_resume_text};
use crate::processing::embeddings::SharedEmbedder;
use crate::processing::normalizer::TextNormalizer;
use crate::store::entities::{CandidateProfile, JobPosting};
use crate::store::ProfileStore;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// How a job run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// The entity was deleted before the job ran.
    Skipped,
}

/// Computes the features of one entity at a time.
///
/// Every step writes its field separately, so the lexical text is already
/// saved when the embedding step starts. Re-running a step overwrites the
/// field with a freshly computed value.
pub struct FeaturePipeline<S> {
    store: Arc<S>,
    normalizer: TextNormalizer,
    embedder: Arc<SharedEmbedder>,
}

impl<S: ProfileStore> FeaturePipeline<S> {
    pub fn new(store: Arc<S>, embedder: Arc<SharedEmbedder>) -> Self {
        Self {
            store,
            normalizer: TextNormalizer::new(),
            embedder,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Both phases for a candidate, in order.
    pub async fn process_candidate(&self, id: u64) -> Result<JobOutcome> {
        info!("Processing candidate {}", id);
        let start_time = Instant::now();

        let outcome = skip_missing(async {
            let profile = self.store.candidate(id).await?;
            let text = self.candidate_composite_text(&profile).await;
            self.persist_candidate_text(id, &text).await?;
            self.persist_candidate_embedding(id, text).await
        })
        .await?;

        debug!("Candidate {} done in {:.2?}", id, start_time.elapsed());
        Ok(outcome)
    }

    /// Lexical phase: composite text, normalized and saved.
    pub async fn process_candidate_text(&self, id: u64) -> Result<JobOutcome> {
        skip_missing(async {
            let profile = self.store.candidate(id).await?;
            let text = self.candidate_composite_text(&profile).await;
            self.persist_candidate_text(id, &text).await
        })
        .await
    }

    /// Semantic phase: embedding of the composite text, saved.
    pub async fn process_candidate_embedding(&self, id: u64) -> Result<JobOutcome> {
        skip_missing(async {
            let profile = self.store.candidate(id).await?;
            let text = self.candidate_composite_text(&profile).await;
            self.persist_candidate_embedding(id, text).await
        })
        .await
    }

    /// Both phases for a posting, in order.
    pub async fn process_posting(&self, id: u64) -> Result<JobOutcome> {
        info!("Processing posting {}", id);
        let start_time = Instant::now();

        let outcome = skip_missing(async {
            let posting = self.store.posting(id).await?;
            let text = self.posting_composite_text(&posting).await?;
            self.persist_posting_text(id, &text).await?;
            self.persist_posting_embedding(id, text).await
        })
        .await?;

        debug!("Posting {} done in {:.2?}", id, start_time.elapsed());
        Ok(outcome)
    }

    pub async fn process_posting_text(&self, id: u64) -> Result<JobOutcome> {
        skip_missing(async {
            let posting = self.store.posting(id).await?;
            let text = self.posting_composite_text(&posting).await?;
            self.persist_posting_text(id, &text).await
        })
        .await
    }

    pub async fn process_posting_embedding(&self, id: u64) -> Result<JobOutcome> {
        skip_missing(async {
            let posting = self.store.posting(id).await?;
            let text = self.posting_composite_text(&posting).await?;
            self.persist_posting_embedding(id, text).await
        })
        .await
    }

    /// Résumé text plus the structured supplement. An unreadable résumé
    /// contributes nothing.
    async fn candidate_composite_text(&self, profile: &CandidateProfile) -> String {
        let resume_text = match &profile.resume_document {
            Some(path) => match extract_resume_text(path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Résumé of candidate {} could not be read, using profile fields only: {}",
                        profile.id, e
                    );
                    String::new()
                }
            },
            None => String::new(),
        };

        build_candidate_text(&resume_text, profile)
    }

    async fn posting_composite_text(&self, posting: &JobPosting) -> Result<String> {
        let employer = match self.store.employer(posting.employer_id).await {
            Ok(employer) => Some(employer),
            Err(RecommenderError::EntityNotFound { .. }) => {
                warn!(
                    "Employer {} of posting {} not found, using posting fields only",
                    posting.employer_id, posting.id
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(build_posting_text(posting, employer.as_ref()))
    }

    async fn persist_candidate_text(&self, id: u64, text: &str) -> Result<JobOutcome> {
        let normalized = self.normalizer.normalize(text);
        debug!("Candidate {}: {} normalized characters", id, normalized.len());
        self.store.save_candidate_text(id, normalized).await?;
        Ok(JobOutcome::Completed)
    }

    async fn persist_candidate_embedding(&self, id: u64, text: String) -> Result<JobOutcome> {
        let embedding = self.embed(text).await?;
        self.store.save_candidate_embedding(id, embedding).await?;
        Ok(JobOutcome::Completed)
    }

    async fn persist_posting_text(&self, id: u64, text: &str) -> Result<JobOutcome> {
        let normalized = self.normalizer.normalize(text);
        debug!("Posting {}: {} normalized characters", id, normalized.len());
        self.store.save_posting_text(id, normalized).await?;
        Ok(JobOutcome::Completed)
    }

    async fn persist_posting_embedding(&self, id: u64, text: String) -> Result<JobOutcome> {
        let embedding = self.embed(text).await?;
        self.store.save_posting_embedding(id, embedding).await?;
        Ok(JobOutcome::Completed)
    }

    /// Embeds on a blocking thread; the result must match the model's width.
    async fn embed(&self, text: String) -> Result<Vec<f32>> {
        let model = self.embedder.get().await?;
        let expected = model.dimension();

        let embedding = tokio::task::spawn_blocking(move || model.embed(&text))
            .await
            .map_err(|e| RecommenderError::Embedding(format!("Embedding task failed: {}", e)))?;

        if embedding.len() != expected {
            return Err(RecommenderError::Embedding(format!(
                "model produced {} dimensions, expected {}",
                embedding.len(),
                expected
            )));
        }
        Ok(embedding)
    }
}

/// A deleted entity ends the job cleanly.
async fn skip_missing<F>(job: F) -> Result<JobOutcome>
where
    F: std::future::Future<Output = Result<JobOutcome>>,
{
    match job.await {
        Err(RecommenderError::EntityNotFound { kind, id }) => {
            info!("Skipping {} {}: no longer exists", kind, id);
            Ok(JobOutcome::Skipped)
        }
        other => other,
    }
}

//! Integration tests for the recommendation core

use emprega_recommender::error::{EntityKind, RecommenderError};
use emprega_recommender::input::extract_resume_text;
use emprega_recommender::pipeline::{backfill, FeaturePipeline, LocalQueue, RetryPolicy};
use emprega_recommender::processing::embeddings::{SharedEmbedder, TextEmbedder};
use emprega_recommender::processing::normalizer::TextNormalizer;
use emprega_recommender::recommendation::{Recommender, Strategy};
use emprega_recommender::store::entities::{CandidateProfile, Employer, JobPosting};
use emprega_recommender::store::{MemoryStore, ProfileStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// One dimension per keyword, set when the text mentions it.
struct KeywordEmbedder;

const KEYWORDS: [&str; 4] = ["python", "software", "vendedor", "varejo"];

impl TextEmbedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        KEYWORDS
            .iter()
            .map(|k| if lowered.contains(k) { 1.0 } else { 0.0 })
            .collect()
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len()
    }

    fn model_name(&self) -> &str {
        "keywords"
    }
}

fn embedder() -> Arc<SharedEmbedder> {
    Arc::new(SharedEmbedder::preloaded(Arc::new(KeywordEmbedder)))
}

/// Posting A (software), posting B (sales) and candidate X with a résumé on disk.
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store
        .insert_employer(Employer {
            id: 1,
            trade_name: "Empresa".to_string(),
            field_of_activity: None,
            description: None,
        })
        .await;

    let mut a = JobPosting::new(100, 1, "Engenheiro de Software");
    a.requirements = Some("experiência Python".to_string());
    let mut b = JobPosting::new(200, 1, "Vendedor");
    b.requirements = Some("experiência varejo".to_string());
    store.insert_posting(a).await;
    store.insert_posting(b).await;

    let mut x = CandidateProfile::new(7, "Mariana Souza");
    x.resume_document = Some(fixture("curriculo.txt"));
    store.insert_candidate(x).await;

    store
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let text = extract_resume_text(&fixture("curriculo.txt")).await.unwrap();

    assert!(text.contains("Mariana Souza"));
    assert!(text.contains("Engenheira de Software"));
    assert!(text.contains("Python"));
    assert!(!text.contains('\n'));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let text = extract_resume_text(&fixture("curriculo.md")).await.unwrap();

    assert!(text.contains("Mariana Souza"));
    assert!(text.contains("Python"));
    assert!(text.contains("integração contínua"));
    // Should not contain markdown formatting
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
    assert!(!text.contains("https://"));
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let result = extract_resume_text(&fixture("curriculo.xyz")).await;
    assert!(matches!(result, Err(RecommenderError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_missing_resume_is_unreadable() {
    let result = extract_resume_text(&fixture("nao_existe.pdf")).await;
    assert!(matches!(result, Err(RecommenderError::DocumentUnreadable(_))));
}

#[tokio::test]
async fn test_end_to_end_lexical_recommendation() {
    let store = seeded_store().await;
    let pipeline = FeaturePipeline::new(Arc::clone(&store), embedder());

    for id in [100, 200] {
        pipeline.process_posting(id).await.unwrap();
    }
    pipeline.process_candidate(7).await.unwrap();

    let x = store.candidate(7).await.unwrap();
    let a = store.posting(100).await.unwrap();
    let b = store.posting(200).await.unwrap();

    let ranked = Recommender::new().recommend_postings(Strategy::Lexical, &x, vec![b, a]);
    let ids: Vec<u64> = ranked.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![100, 200]);
}

#[tokio::test]
async fn test_end_to_end_semantic_recommendation() {
    let store = seeded_store().await;
    let pipeline = FeaturePipeline::new(Arc::clone(&store), embedder());

    for id in [100, 200] {
        pipeline.process_posting(id).await.unwrap();
    }
    pipeline.process_candidate(7).await.unwrap();

    let x = store.candidate(7).await.unwrap();
    let result = Recommender::new().recommend_scored(Strategy::Semantic, &x, store.postings().await);

    assert_eq!(result.strategy, Strategy::Semantic);
    assert_eq!(result.ranked[0].item.id, 100);
    assert!(result.ranked[0].score > result.ranked[1].score);
}

#[tokio::test]
async fn test_candidates_ranked_for_posting() {
    let store = seeded_store().await;

    let mut seller = CandidateProfile::new(8, "Carlos Lima");
    seller.current_role = Some("Vendedor no varejo".to_string());
    store.insert_candidate(seller).await;

    let pipeline = FeaturePipeline::new(Arc::clone(&store), embedder());
    pipeline.process_posting(200).await.unwrap();
    pipeline.process_candidate(7).await.unwrap();
    pipeline.process_candidate(8).await.unwrap();

    let posting = store.posting(200).await.unwrap();
    let ranked = Recommender::new().recommend_candidates(
        Strategy::Lexical,
        &posting,
        store.candidates().await,
    );
    assert_eq!(ranked[0].id, 8);
    assert_eq!(ranked.len(), 2);
}

#[tokio::test]
async fn test_semantic_falls_back_before_processing() {
    let store = seeded_store().await;
    let pipeline = FeaturePipeline::new(Arc::clone(&store), embedder());
    for id in [100, 200] {
        pipeline.process_posting(id).await.unwrap();
    }
    // Lexical phase only: the candidate has text but no embedding yet.
    pipeline.process_candidate_text(7).await.unwrap();

    let x = store.candidate(7).await.unwrap();
    assert!(x.resume_embedding.is_none());

    let b = store.posting(200).await.unwrap();
    let a = store.posting(100).await.unwrap();
    let result = Recommender::new().recommend_scored(Strategy::Semantic, &x, vec![b, a]);

    assert_eq!(result.strategy, Strategy::Lexical);
    assert_eq!(result.ranked.len(), 2);
    assert_eq!(result.ranked[0].item.id, 100);
}

#[tokio::test]
async fn test_unreadable_resume_still_yields_text() {
    let store = Arc::new(MemoryStore::new());
    let mut profile = CandidateProfile::new(9, "Ana");
    profile.resume_document = Some(fixture("curriculo.xyz"));
    profile.current_role = Some("Analista de suporte".to_string());
    store.insert_candidate(profile).await;

    let pipeline = FeaturePipeline::new(Arc::clone(&store), embedder());
    pipeline.process_candidate(9).await.unwrap();

    let saved = store.candidate(9).await.unwrap();
    assert_eq!(
        saved.resume_text_normalized.as_deref(),
        Some(TextNormalizer::new().normalize("Analista de suporte").as_str())
    );
}

#[tokio::test]
async fn test_backfill_through_local_queue() {
    let store = seeded_store().await;
    let pipeline = Arc::new(FeaturePipeline::new(Arc::clone(&store), embedder()));
    let queue = LocalQueue::start(
        pipeline,
        RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_millis(1),
        },
    );

    let queued = backfill(EntityKind::Posting, store.as_ref(), &queue, Duration::ZERO, false)
        .await
        .unwrap();
    queue.drain().await;

    assert_eq!(queued, 2);
    // One lexical and one embedding task per posting.
    assert_eq!(queue.stats().completed, 4);
    for posting in store.postings().await {
        assert!(posting.posting_text_normalized.is_some());
        assert_eq!(posting.posting_embedding.map(|e| e.len()), Some(KEYWORDS.len()));
    }
}

#[tokio::test]
async fn test_deleted_entity_job_exits_cleanly() {
    let store = seeded_store().await;
    let pipeline = Arc::new(FeaturePipeline::new(Arc::clone(&store), embedder()));
    let queue = LocalQueue::start(pipeline, RetryPolicy::default());

    backfill(EntityKind::Candidate, store.as_ref(), &queue, Duration::ZERO, false)
        .await
        .unwrap();
    store.remove_candidate(7).await;
    queue.drain().await;

    let stats = queue.stats();
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.retried, 0);
}

#[tokio::test]
async fn test_snapshot_round_trip_keeps_features() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let store = seeded_store().await;
    FeaturePipeline::new(Arc::clone(&store), embedder())
        .process_posting(100)
        .await
        .unwrap();
    store.save(&path).await.unwrap();

    let reloaded = MemoryStore::load(&path).await.unwrap();
    let posting = reloaded.posting(100).await.unwrap();
    assert_eq!(posting, store.posting(100).await.unwrap());
    assert!(posting.posting_embedding.is_some());
}

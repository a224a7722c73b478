//! In-memory store with JSON snapshot persistence

use crate::error::{EntityKind, RecommenderError, Result};
use crate::store::entities::{CandidateProfile, Employer, JobPosting};
use crate::store::ProfileStore;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub candidates: Vec<CandidateProfile>,
    #[serde(default)]
    pub postings: Vec<JobPosting>,
    #[serde(default)]
    pub employers: Vec<Employer>,
}

#[derive(Debug, Default)]
struct Tables {
    candidates: BTreeMap<u64, CandidateProfile>,
    postings: BTreeMap<u64, JobPosting>,
    employers: BTreeMap<u64, Employer>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let tables = Tables {
            candidates: snapshot.candidates.into_iter().map(|c| (c.id, c)).collect(),
            postings: snapshot.postings.into_iter().map(|p| (p.id, p)).collect(),
            employers: snapshot.employers.into_iter().map(|e| (e.id, e)).collect(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Load a snapshot file; a missing file yields an empty store.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        info!(
            "Loaded {} candidates, {} postings, {} employers from {}",
            snapshot.candidates.len(),
            snapshot.postings.len(),
            snapshot.employers.len(),
            path.display()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&self.snapshot().await)?;
        fs::write(path, content).await?;
        debug!("Snapshot written to {}", path.display());
        Ok(())
    }

    pub async fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read().await;
        Snapshot {
            candidates: tables.candidates.values().cloned().collect(),
            postings: tables.postings.values().cloned().collect(),
            employers: tables.employers.values().cloned().collect(),
        }
    }

    pub async fn insert_candidate(&self, candidate: CandidateProfile) {
        self.tables.write().await.candidates.insert(candidate.id, candidate);
    }

    pub async fn insert_posting(&self, posting: JobPosting) {
        self.tables.write().await.postings.insert(posting.id, posting);
    }

    pub async fn insert_employer(&self, employer: Employer) {
        self.tables.write().await.employers.insert(employer.id, employer);
    }

    pub async fn remove_candidate(&self, id: u64) -> Option<CandidateProfile> {
        self.tables.write().await.candidates.remove(&id)
    }

    pub async fn remove_posting(&self, id: u64) -> Option<JobPosting> {
        self.tables.write().await.postings.remove(&id)
    }

    pub async fn candidates(&self) -> Vec<CandidateProfile> {
        self.tables.read().await.candidates.values().cloned().collect()
    }

    pub async fn postings(&self) -> Vec<JobPosting> {
        self.tables.read().await.postings.values().cloned().collect()
    }
}

impl ProfileStore for MemoryStore {
    async fn candidate(&self, id: u64) -> Result<CandidateProfile> {
        self.tables
            .read()
            .await
            .candidates
            .get(&id)
            .cloned()
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Candidate, id))
    }

    async fn posting(&self, id: u64) -> Result<JobPosting> {
        self.tables
            .read()
            .await
            .postings
            .get(&id)
            .cloned()
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Posting, id))
    }

    async fn employer(&self, id: u64) -> Result<Employer> {
        self.tables
            .read()
            .await
            .employers
            .get(&id)
            .cloned()
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Employer, id))
    }

    async fn candidate_ids(&self) -> Result<Vec<u64>> {
        Ok(self.tables.read().await.candidates.keys().copied().collect())
    }

    async fn posting_ids(&self) -> Result<Vec<u64>> {
        Ok(self.tables.read().await.postings.keys().copied().collect())
    }

    async fn save_candidate_text(&self, id: u64, text: String) -> Result<()> {
        let mut tables = self.tables.write().await;
        let candidate = tables
            .candidates
            .get_mut(&id)
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Candidate, id))?;
        candidate.resume_text_normalized = Some(text);
        Ok(())
    }

    async fn save_candidate_embedding(&self, id: u64, embedding: Vec<f32>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let candidate = tables
            .candidates
            .get_mut(&id)
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Candidate, id))?;
        candidate.resume_embedding = Some(embedding);
        Ok(())
    }

    async fn save_posting_text(&self, id: u64, text: String) -> Result<()> {
        let mut tables = self.tables.write().await;
        let posting = tables
            .postings
            .get_mut(&id)
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Posting, id))?;
        posting.posting_text_normalized = Some(text);
        Ok(())
    }

    async fn save_posting_embedding(&self, id: u64, embedding: Vec<f32>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let posting = tables
            .postings
            .get_mut(&id)
            .ok_or_else(|| RecommenderError::not_found(EntityKind::Posting, id))?;
        posting.posting_embedding = Some(embedding);
        Ok(())
    }
}

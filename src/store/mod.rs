//! Persistence contract used by the ranking core
//! Entities are fetched by primary key; each feature field is saved with its own write

pub mod entities;
pub mod memory;

use crate::error::Result;
use entities::{CandidateProfile, Employer, JobPosting};
use std::future::Future;

pub use memory::MemoryStore;

pub trait ProfileStore: Send + Sync {
    /// Fails with `EntityNotFound` when the id no longer exists.
    fn candidate(&self, id: u64) -> impl Future<Output = Result<CandidateProfile>> + Send;

    fn posting(&self, id: u64) -> impl Future<Output = Result<JobPosting>> + Send;

    fn employer(&self, id: u64) -> impl Future<Output = Result<Employer>> + Send;

    fn candidate_ids(&self) -> impl Future<Output = Result<Vec<u64>>> + Send;

    fn posting_ids(&self) -> impl Future<Output = Result<Vec<u64>>> + Send;

    fn save_candidate_text(&self, id: u64, text: String) -> impl Future<Output = Result<()>> + Send;

    fn save_candidate_embedding(
        &self,
        id: u64,
        embedding: Vec<f32>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn save_posting_text(&self, id: u64, text: String) -> impl Future<Output = Result<()>> + Send;

    fn save_posting_embedding(
        &self,
        id: u64,
        embedding: Vec<f32>,
    ) -> impl Future<Output = Result<()>> + Send;
}

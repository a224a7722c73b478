//! Report structures for ranked recommendations

use crate::error::EntityKind;
use crate::recommendation::{Rankable, Recommendation, Strategy};
use crate::store::entities::{CandidateProfile, JobPosting};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One ranking, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub generated_at: DateTime<Utc>,
    pub pivot: EntitySummary,
    pub requested_strategy: Strategy,
    /// Differs from `requested_strategy` after a fallback.
    pub strategy: Strategy,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub kind: EntityKind,
    pub id: u64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub rank: usize,
    pub entity: EntitySummary,
    pub score: f32,
    pub has_text: bool,
    pub has_embedding: bool,
}

/// Short identification of an entity for display.
pub trait Describe {
    fn summary(&self) -> EntitySummary;
}

impl Describe for CandidateProfile {
    fn summary(&self) -> EntitySummary {
        let label = match &self.objective {
            Some(objective) => format!("{} ({})", self.name, objective.desired_role),
            None => self.name.clone(),
        };
        EntitySummary {
            kind: EntityKind::Candidate,
            id: self.id,
            label,
        }
    }
}

impl Describe for JobPosting {
    fn summary(&self) -> EntitySummary {
        EntitySummary {
            kind: EntityKind::Posting,
            id: self.id,
            label: self.title.clone().unwrap_or_else(|| "(untitled)".to_string()),
        }
    }
}

impl RecommendationReport {
    pub fn new<P, C>(pivot: &P, requested_strategy: Strategy, result: &Recommendation<C>) -> Self
    where
        P: Describe,
        C: Describe + Rankable,
    {
        let entries = result
            .ranked
            .iter()
            .enumerate()
            .map(|(i, ranked)| ReportEntry {
                rank: i + 1,
                entity: ranked.item.summary(),
                score: ranked.score,
                has_text: ranked
                    .item
                    .normalized_text()
                    .is_some_and(|text| !text.is_empty()),
                has_embedding: ranked.item.embedding().is_some(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            pivot: pivot.summary(),
            requested_strategy,
            strategy: result.strategy,
            entries,
        }
    }

    pub fn fell_back(&self) -> bool {
        self.strategy != self.requested_strategy
    }
}

//! Recommendation facade: reorders candidates or postings around a pivot

use crate::processing::similarity::{rank_scored, FeatureVector, Ranked};
use crate::processing::tfidf::{LexicalVectorizer, TfIdfSpace};
use crate::store::entities::{CandidateProfile, JobPosting};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How entities are turned into comparable vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// TF-IDF over normalized text
    Lexical,
    /// Cosine over precomputed sentence embeddings
    Semantic,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "tfidf" => Ok(Strategy::Lexical),
            "semantic" | "bert" => Ok(Strategy::Semantic),
            _ => Err(format!("Invalid strategy: {}. Supported: lexical, semantic", s)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Lexical => write!(f, "lexical"),
            Strategy::Semantic => write!(f, "semantic"),
        }
    }
}

/// Read access to the features the offline pipeline persisted on an entity.
pub trait Rankable {
    fn normalized_text(&self) -> Option<&str>;

    fn embedding(&self) -> Option<&[f32]>;
}

impl Rankable for CandidateProfile {
    fn normalized_text(&self) -> Option<&str> {
        self.resume_text_normalized.as_deref()
    }

    fn embedding(&self) -> Option<&[f32]> {
        self.resume_embedding.as_deref()
    }
}

impl Rankable for JobPosting {
    fn normalized_text(&self) -> Option<&str> {
        self.posting_text_normalized.as_deref()
    }

    fn embedding(&self) -> Option<&[f32]> {
        self.posting_embedding.as_deref()
    }
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn normalized_text(&self) -> Option<&str> {
        (**self).normalized_text()
    }

    fn embedding(&self) -> Option<&[f32]> {
        (**self).embedding()
    }
}

/// The reordered candidates together with their scores and the strategy
/// that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation<T> {
    pub strategy: Strategy,
    pub ranked: Vec<Ranked<T>>,
}

impl<T> Recommendation<T> {
    pub fn into_items(self) -> Vec<T> {
        self.ranked.into_iter().map(|r| r.item).collect()
    }
}

/// The vector space one recommendation call works in.
enum FeatureSpace<'a> {
    Lexical(TfIdfSpace<'a>),
    Semantic { dimension: usize },
}

impl<'a> FeatureSpace<'a> {
    /// Fit TF-IDF on the candidates' texts, or take the pivot's embedding width.
    fn fit<P, C>(
        strategy: Strategy,
        vectorizer: &'a LexicalVectorizer,
        pivot: &P,
        candidates: &[C],
    ) -> Self
    where
        P: Rankable + ?Sized,
        C: Rankable,
    {
        match (strategy, pivot.embedding()) {
            (Strategy::Semantic, Some(embedding)) if !embedding.is_empty() => FeatureSpace::Semantic {
                dimension: embedding.len(),
            },
            _ => {
                let corpus: Vec<String> = candidates
                    .iter()
                    .map(|c| c.normalized_text().unwrap_or_default().to_string())
                    .collect();
                FeatureSpace::Lexical(vectorizer.fit(&corpus))
            }
        }
    }

    /// Project one entity; missing features become an all-zero vector.
    fn project<R: Rankable + ?Sized>(&self, item: &R) -> FeatureVector {
        match self {
            FeatureSpace::Lexical(space) => {
                FeatureVector::Lexical(space.transform(item.normalized_text().unwrap_or_default()))
            }
            FeatureSpace::Semantic { dimension } => match item.embedding() {
                Some(embedding) if embedding.len() == *dimension => {
                    FeatureVector::Semantic(embedding.to_vec())
                }
                Some(embedding) => {
                    warn!(
                        "Ignoring embedding with {} dims, expected {}",
                        embedding.len(),
                        dimension
                    );
                    FeatureVector::Semantic(vec![0.0; *dimension])
                }
                None => FeatureVector::Semantic(vec![0.0; *dimension]),
            },
        }
    }

    fn strategy(&self) -> Strategy {
        match self {
            FeatureSpace::Lexical(_) => Strategy::Lexical,
            FeatureSpace::Semantic { .. } => Strategy::Semantic,
        }
    }
}

/// Entry point for the API layer. Synchronous and read-only: it uses the
/// features already persisted on the entities and never computes new ones.
pub struct Recommender {
    vectorizer: LexicalVectorizer,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    pub fn new() -> Self {
        Self::with_vectorizer(LexicalVectorizer::new())
    }

    pub fn with_vectorizer(vectorizer: LexicalVectorizer) -> Self {
        Self { vectorizer }
    }

    /// Return exactly `candidates`, most similar to `pivot` first.
    pub fn recommend<P, C>(&self, strategy: Strategy, pivot: &P, candidates: Vec<C>) -> Vec<C>
    where
        P: Rankable + ?Sized,
        C: Rankable,
    {
        self.recommend_scored(strategy, pivot, candidates).into_items()
    }

    /// Like [`Recommender::recommend`], keeping the scores.
    ///
    /// `Semantic` falls back to `Lexical` when the pivot has no (or an empty)
    /// embedding yet.
    /// Missing candidate features count as empty text or a zero vector, so
    /// such candidates sink to the bottom but are never dropped.
    pub fn recommend_scored<P, C>(
        &self,
        strategy: Strategy,
        pivot: &P,
        candidates: Vec<C>,
    ) -> Recommendation<C>
    where
        P: Rankable + ?Sized,
        C: Rankable,
    {
        let space = FeatureSpace::fit(strategy, &self.vectorizer, pivot, &candidates);
        if space.strategy() != strategy {
            debug!("Pivot has no embedding yet, falling back to {}", space.strategy());
        }

        let used = space.strategy();
        if candidates.is_empty() {
            return Recommendation {
                strategy: used,
                ranked: Vec::new(),
            };
        }

        let query = space.project(pivot);
        let vectors: Vec<FeatureVector> = candidates.iter().map(|c| space.project(c)).collect();

        // Every vector comes from the same space, so ranking cannot fail
        // here. Should it anyway, keep the input order.
        let ranked = match rank_scored(&query, &vectors, (0..candidates.len()).collect()) {
            Ok(order) => order,
            Err(e) => {
                error!("Ranking failed, keeping input order: {}", e);
                (0..candidates.len())
                    .map(|i| Ranked { item: i, score: 0.0 })
                    .collect()
            }
        };

        let mut slots: Vec<Option<C>> = candidates.into_iter().map(Some).collect();
        let ranked = ranked
            .into_iter()
            .filter_map(|r| {
                slots[r.item].take().map(|item| Ranked {
                    item,
                    score: r.score,
                })
            })
            .collect();

        Recommendation {
            strategy: used,
            ranked,
        }
    }

    /// Postings for a candidate, best match first.
    pub fn recommend_postings(
        &self,
        strategy: Strategy,
        candidate: &CandidateProfile,
        postings: Vec<JobPosting>,
    ) -> Vec<JobPosting> {
        self.recommend(strategy, candidate, postings)
    }

    /// Candidates for a posting, best match first.
    pub fn recommend_candidates(
        &self,
        strategy: Strategy,
        posting: &JobPosting,
        candidates: Vec<CandidateProfile>,
    ) -> Vec<CandidateProfile> {
        self.recommend(strategy, posting, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        text: Option<&'static str>,
        embedding: Option<Vec<f32>>,
    }

    impl Item {
        fn new(name: &'static str, text: Option<&'static str>, embedding: Option<Vec<f32>>) -> Self {
            Self { name, text, embedding }
        }
    }

    impl Rankable for Item {
        fn normalized_text(&self) -> Option<&str> {
            self.text
        }

        fn embedding(&self) -> Option<&[f32]> {
            self.embedding.as_deref()
        }
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_strategy_parsing_accepts_legacy_names() {
        assert_eq!("tfidf".parse::<Strategy>().unwrap(), Strategy::Lexical);
        assert_eq!("BERT".parse::<Strategy>().unwrap(), Strategy::Semantic);
        assert_eq!("semantic".parse::<Strategy>().unwrap(), Strategy::Semantic);
        assert!("bm25".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_semantic_ranking() {
        let recommender = Recommender::new();
        let pivot = Item::new("pivot", None, Some(vec![1.0, 0.0]));
        let candidates = vec![
            Item::new("orthogonal", None, Some(vec![0.0, 1.0])),
            Item::new("pending", None, None),
            Item::new("aligned", None, Some(vec![2.0, 0.1])),
        ];

        let result = recommender.recommend_scored(Strategy::Semantic, &pivot, candidates);
        assert_eq!(result.strategy, Strategy::Semantic);
        let order: Vec<_> = result.ranked.iter().map(|r| r.item.name).collect();
        assert_eq!(order, vec!["aligned", "orthogonal", "pending"]);
    }

    #[test]
    fn test_semantic_without_pivot_embedding_falls_back() {
        let recommender = Recommender::new();
        let pivot = Item::new("pivot", Some("python django"), None);
        let candidates = vec![
            Item::new("sales", Some("vend varej"), Some(vec![1.0])),
            Item::new("dev", Some("python flask"), Some(vec![1.0])),
        ];

        let result = recommender.recommend_scored(Strategy::Semantic, &pivot, candidates);
        assert_eq!(result.strategy, Strategy::Lexical);
        let order: Vec<_> = result.ranked.iter().map(|r| r.item.name).collect();
        assert_eq!(order, vec!["dev", "sales"]);
    }

    #[test]
    fn test_mismatched_candidate_embedding_sinks() {
        let recommender = Recommender::new();
        let pivot = Item::new("pivot", None, Some(vec![1.0, 1.0]));
        let candidates = vec![
            Item::new("stale", None, Some(vec![1.0, 1.0, 1.0])),
            Item::new("fresh", None, Some(vec![0.5, 1.0])),
        ];

        let ranked = recommender.recommend(Strategy::Semantic, &pivot, candidates);
        assert_eq!(names(&ranked), vec!["fresh", "stale"]);
    }

    #[test]
    fn test_all_empty_texts_keep_input_order() {
        let recommender = Recommender::new();
        let pivot = Item::new("pivot", None, None);
        let candidates = vec![
            Item::new("a", None, None),
            Item::new("b", Some(""), None),
            Item::new("c", None, None),
        ];

        let ranked = recommender.recommend(Strategy::Lexical, &pivot, candidates);
        assert_eq!(names(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_candidate_set() {
        let recommender = Recommender::new();
        let pivot = Item::new("pivot", Some("python"), Some(vec![1.0]));

        for strategy in [Strategy::Lexical, Strategy::Semantic] {
            let ranked = recommender.recommend(strategy, &pivot, Vec::<Item>::new());
            assert!(ranked.is_empty());
        }
    }

    #[test]
    fn test_references_can_be_ranked() {
        let recommender = Recommender::new();
        let pivot = Item::new("pivot", None, Some(vec![0.0, 1.0]));
        let owned = vec![
            Item::new("x", None, Some(vec![1.0, 0.0])),
            Item::new("y", None, Some(vec![0.0, 1.0])),
        ];

        let ranked = recommender.recommend(Strategy::Semantic, &pivot, owned.iter().collect());
        assert_eq!(ranked[0].name, "y");
        assert_eq!(owned.len(), 2);
    }
}

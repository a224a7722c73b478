//! Property tests for normalization and ranking

use emprega_recommender::processing::normalizer::TextNormalizer;
use emprega_recommender::processing::similarity::{cosine_similarity, rank, rank_scored, FeatureVector};
use emprega_recommender::recommendation::{Rankable, Recommender, Strategy as RankStrategy};
use proptest::prelude::*;

fn portuguese_text() -> impl Strategy<Value = String> {
    "[a-zA-ZáàâãéêíóôõúçÁÂÃÉÊÍÓÔÕÚÇ0-9 ,.;:!?()/\n-]{0,120}"
}

fn dense_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, dim)
}

#[derive(Debug, Clone)]
struct Doc {
    id: usize,
    text: String,
}

impl Rankable for Doc {
    fn normalized_text(&self) -> Option<&str> {
        Some(&self.text)
    }

    fn embedding(&self) -> Option<&[f32]> {
        None
    }
}

proptest! {
    #[test]
    fn normalization_is_idempotent(text in portuguese_text()) {
        let normalizer = TextNormalizer::new();
        let once = normalizer.normalize(&text);
        prop_assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn normalized_text_has_no_accents_or_uppercase(text in portuguese_text()) {
        let normalized = TextNormalizer::new().normalize(&text);
        prop_assert!(!normalized.chars().any(|c| "áàâãéêíóôõúç".contains(c)));
        prop_assert!(!normalized.chars().any(char::is_uppercase));
        prop_assert!(!normalized.contains("  "));
    }

    #[test]
    fn ranking_is_a_permutation(
        (query, vectors) in (1usize..8).prop_flat_map(|dim| {
            (dense_vector(dim), prop::collection::vec(dense_vector(dim), 0..20))
        })
    ) {
        let query = FeatureVector::Semantic(query);
        let vectors: Vec<FeatureVector> = vectors.into_iter().map(FeatureVector::Semantic).collect();
        let items: Vec<usize> = (0..vectors.len()).collect();

        let mut ranked = rank(&query, &vectors, items.clone()).unwrap();
        ranked.sort_unstable();
        prop_assert_eq!(ranked, items);
    }

    #[test]
    fn ranking_is_descending(
        (query, vectors) in (1usize..8).prop_flat_map(|dim| {
            (dense_vector(dim), prop::collection::vec(dense_vector(dim), 0..20))
        })
    ) {
        let query = FeatureVector::Semantic(query);
        let vectors: Vec<FeatureVector> = vectors.into_iter().map(FeatureVector::Semantic).collect();
        let items: Vec<usize> = (0..vectors.len()).collect();

        let ranked = rank_scored(&query, &vectors, items).unwrap();
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for entry in &ranked {
            let expected = cosine_similarity(&query, &vectors[entry.item]).unwrap();
            prop_assert_eq!(entry.score, expected);
        }
    }

    #[test]
    fn self_similarity_is_one(v in dense_vector(6)) {
        prop_assume!(v.iter().any(|x| x.abs() > 1e-3));
        let v = FeatureVector::Semantic(v);
        let score = cosine_similarity(&v, &v).unwrap();
        prop_assert!((score - 1.0).abs() < 1e-4);
    }

    #[test]
    fn recommend_returns_exactly_the_input(
        pivot in portuguese_text(),
        texts in prop::collection::vec(portuguese_text(), 0..12),
    ) {
        let normalizer = TextNormalizer::new();
        let pivot = Doc { id: usize::MAX, text: normalizer.normalize(&pivot) };
        let docs: Vec<Doc> = texts
            .iter()
            .enumerate()
            .map(|(id, t)| Doc { id, text: normalizer.normalize(t) })
            .collect();

        for strategy in [RankStrategy::Lexical, RankStrategy::Semantic] {
            let mut ids: Vec<usize> = Recommender::new()
                .recommend(strategy, &pivot, docs.clone())
                .iter()
                .map(|d| d.id)
                .collect();
            ids.sort_unstable();
            prop_assert_eq!(ids, (0..docs.len()).collect::<Vec<_>>());
        }
    }
}

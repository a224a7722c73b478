//! Text normalization, vectorization and similarity

pub mod embedding_manager;
pub mod embeddings;
pub mod normalizer;
pub mod similarity;
pub mod tfidf;

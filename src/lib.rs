//! Recommendation core of the emprega job board: matches candidates to job
//! postings by lexical or semantic text similarity.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod recommendation;
pub mod store;

pub use config::Config;
pub use error::{EntityKind, RecommenderError, Result};
pub use recommendation::{Rankable, Recommendation, Recommender, Strategy};

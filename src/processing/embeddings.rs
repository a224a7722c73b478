//! Sentence embeddings using Model2Vec

use crate::error::{RecommenderError, Result};
use crate::processing::embedding_manager::ModelLoader;
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

/// Maps free text to a fixed-size dense vector.
pub trait TextEmbedder: Send + Sync {
    /// Deterministic; over-long input is truncated, never rejected.
    fn embed(&self, text: &str) -> Vec<f32>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
    dimension: usize,
    max_tokens: usize,
    batch_size: usize,
}

impl Model2VecEmbedder {
    /// Load a model from a local directory holding tokenizer, weights and config.
    pub fn from_dir(
        model_dir: &Path,
        model_name: &str,
        max_tokens: usize,
        batch_size: usize,
    ) -> Result<Self> {
        let start_time = Instant::now();

        let model = StaticModel::from_pretrained(
            model_dir,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        // An empty sentence pools to a zero vector of the model's width.
        let dimension = model.encode_single("").len();
        if dimension == 0 {
            return Err(RecommenderError::ModelUnavailable(format!(
                "model at {} has no embedding dimensions",
                model_dir.display()
            )));
        }

        info!(
            "Loaded embedding model {} ({} dims) in {:.2?}",
            model_name,
            dimension,
            start_time.elapsed()
        );

        Ok(Self {
            model,
            model_name: model_name.to_string(),
            dimension,
            max_tokens,
            batch_size: batch_size.max(1),
        })
    }
}

impl TextEmbedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        self.model
            .encode_with_args(&[text.to_string()], Some(self.max_tokens), self.batch_size)
            .into_iter()
            .next()
            .unwrap_or_else(|| vec![0.0; self.dimension])
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Process-wide embedding model handle, loaded on first use.
///
/// Owned by the process's startup code and passed to whoever needs
/// embeddings. A failed load leaves the handle empty so a later call can try
/// again.
pub struct SharedEmbedder {
    loader: Option<ModelLoader>,
    model_name: String,
    model: OnceCell<Arc<dyn TextEmbedder>>,
}

impl SharedEmbedder {
    pub fn new(loader: ModelLoader, model_name: impl Into<String>) -> Self {
        Self {
            loader: Some(loader),
            model_name: model_name.into(),
            model: OnceCell::new(),
        }
    }

    /// Wrap an already loaded model.
    pub fn preloaded(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            loader: None,
            model_name: embedder.model_name().to_string(),
            model: OnceCell::new_with(Some(embedder)),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn TextEmbedder>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let loader = self.loader.as_ref().ok_or_else(|| {
                    RecommenderError::ModelUnavailable(format!(
                        "no loader configured for {}",
                        self.model_name
                    ))
                })?;
                let embedder = loader.load(&self.model_name).await?;
                Ok::<_, RecommenderError>(Arc::new(embedder) as Arc<dyn TextEmbedder>)
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

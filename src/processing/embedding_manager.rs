//! Embedding model cache: load from disk, download on a cache miss

use crate::config::Config;
use crate::error::{RecommenderError, Result};
use crate::processing::embeddings::Model2VecEmbedder;
use hf_hub::api::tokio::Api;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files a Model2Vec model directory must contain.
const REQUIRED_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];

/// Resolves model names to local directories under `cache_dir`, one
/// subdirectory per model, downloading from the Hugging Face Hub on a miss.
#[derive(Debug, Clone)]
pub struct ModelLoader {
    cache_dir: PathBuf,
    max_tokens: usize,
    batch_size: usize,
}

impl ModelLoader {
    pub fn new(cache_dir: PathBuf, max_tokens: usize, batch_size: usize) -> Self {
        Self {
            cache_dir,
            max_tokens,
            batch_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.models.cache_dir.clone(),
            config.models.max_tokens,
            config.models.batch_size,
        )
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache directory for a hub repo id such as `minishlab/potion-base-8M`.
    pub fn model_dir(&self, model_name: &str) -> PathBuf {
        self.cache_dir.join(model_name.replace('/', "--"))
    }

    pub fn is_cached(&self, model_name: &str) -> bool {
        let dir = self.model_dir(model_name);
        REQUIRED_FILES.iter().all(|file| dir.join(file).is_file())
    }

    /// Local directory holding the model, downloading it first if needed.
    ///
    /// A name that is itself an existing directory is used as-is.
    pub async fn ensure_cached(&self, model_name: &str) -> Result<PathBuf> {
        let local = Path::new(model_name);
        if local.is_dir() {
            return Ok(local.to_path_buf());
        }

        let model_dir = self.model_dir(model_name);
        if self.is_cached(model_name) {
            debug!("Model {} found in cache at {}", model_name, model_dir.display());
            return Ok(model_dir);
        }

        self.download(model_name, &model_dir).await?;
        Ok(model_dir)
    }

    async fn download(&self, model_name: &str, model_dir: &Path) -> Result<()> {
        info!("Downloading embedding model {} into {}", model_name, model_dir.display());

        fs::create_dir_all(model_dir).await?;

        let api = Api::new().map_err(|e| {
            RecommenderError::ModelUnavailable(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.model(model_name.to_string());

        for file in REQUIRED_FILES {
            let fetched = repo.get(file).await.map_err(|e| {
                RecommenderError::ModelUnavailable(format!(
                    "Failed to download {} for {}: {}",
                    file, model_name, e
                ))
            })?;
            install_file(&fetched, &model_dir.join(file)).await?;
            debug!("  downloaded {}", file);
        }

        info!("Embedding model {} cached", model_name);
        Ok(())
    }

    /// Load a model by name, populating the cache on the first call.
    pub async fn load(&self, model_name: &str) -> Result<Model2VecEmbedder> {
        let model_dir = self.ensure_cached(model_name).await?;

        let name = model_name.to_string();
        let (max_tokens, batch_size) = (self.max_tokens, self.batch_size);
        tokio::task::spawn_blocking(move || {
            Model2VecEmbedder::from_dir(&model_dir, &name, max_tokens, batch_size)
        })
        .await
        .map_err(|e| RecommenderError::ModelUnavailable(format!("Model loading aborted: {}", e)))?
    }
}

/// Copy through a temporary file and rename into place, so concurrent
/// downloads of the same model each leave a complete file behind.
async fn install_file(source: &Path, destination: &Path) -> Result<()> {
    let source = source.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let dir = destination.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        let mut reader = std::fs::File::open(&source)?;
        std::io::copy(&mut reader, &mut staged)?;
        staged.persist(&destination).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| RecommenderError::ModelUnavailable(format!("Model install aborted: {}", e)))?
}

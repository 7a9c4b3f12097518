//! Sentence embedding for ingestion and retrieval.
//!
//! The real embedder runs BGE-M3 locally through candle. The hashing
//! `FakeEmbedder` (enabled with `APP_USE_FAKE_EMBEDDINGS=1`) keeps tests
//! and development fast and deterministic without model weights.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use askrag_core::error::Error;
use askrag_core::traits::Embedder;

mod device;
mod pooling;
mod tokenize;

pub use pooling::masked_mean_l2;

/// Dimensionality of every vector this crate produces.
pub const EMBEDDING_DIM: usize = 1024;

const MAX_TOKENS: usize = 256;

pub struct EmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingModel {
    pub fn new() -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir()?;
        info!("loading BGE-M3 from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!("BGE-M3 ready");
        Ok(Self { model, tokenizer, device })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, MAX_TOKENS, &self.device)?;
        let token_type_ids = Tensor::zeros((1, MAX_TOKENS), DType::I64, &self.device)?;
        let hidden = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = pooling::masked_mean_l2(&hidden, &attention_mask)?;
        let vector = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if vector.len() != EMBEDDING_DIM {
            return Err(anyhow!(
                "model produced a {}-dim vector, expected {}",
                vector.len(),
                EMBEDDING_DIM
            ));
        }
        if start.elapsed().as_millis() > 100 {
            warn!("slow embedding: {}ms", start.elapsed().as_millis());
        }
        Ok(vector)
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    fn max_len(&self) -> usize {
        MAX_TOKENS
    }

    fn embed_batch(&self, texts: &[String]) -> askrag_core::error::Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|t| self.embed_one(t).map_err(Error::generation))
            .collect()
    }
}

/// Deterministic hashing embedder: each whitespace token bumps one bucket,
/// then the vector is L2-normalized. Useless semantically, but stable,
/// fast, and shaped exactly like the real model's output.
struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        MAX_TOKENS
    }

    fn embed_batch(&self, texts: &[String]) -> askrag_core::error::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// The embedder the engine uses unless the caller injects one:
/// `APP_USE_FAKE_EMBEDDINGS=1` switches to the hashing fake, otherwise the
/// local model is loaded.
pub fn get_default_embedder() -> askrag_core::error::Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        debug!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(EMBEDDING_DIM)));
    }
    Ok(Box::new(EmbeddingModel::new().map_err(Error::generation)?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let root = Path::new("models/bge-m3");
    if root.exists() {
        return Ok(root.to_path_buf());
    }
    Err(anyhow!("Could not locate BGE-M3 model directory"))
}

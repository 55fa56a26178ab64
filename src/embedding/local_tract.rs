//! Tract-based local embedding backend (fallback for musl and Intel Mac).
//!
//! Pure-Rust path: loads the ONNX model with tract-onnx and tokenizes with
//! the tokenizers crate. No ONNX Runtime or system deps. The model is
//! optimized once in [`TractEncoder::load`] and reused for every batch.
#![cfg_attr(
    all(feature = "local-embeddings-fastembed", feature = "local-embeddings-tract"),
    allow(dead_code)
)]

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

const ALL_MINILM_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";
const ALL_MINILM_DIMS: usize = 384;
const DEFAULT_MAX_LEN: usize = 256;

type RunFn = Box<dyn Fn(TVec<TValue>) -> TractResult<TVec<TValue>> + Send + Sync>;

/// A loaded sentence-embedding model.
pub struct TractEncoder {
    tokenizer: tokenizers::Tokenizer,
    run: RunFn,
    dims: usize,
}

/// Model manifest: name -> (onnx path in repo, tokenizer path in repo, dims).
fn model_manifest(model_name: &str) -> Result<(&'static str, &'static str, usize)> {
    match model_name {
        "all-minilm-l6-v2" => Ok(("onnx/model.onnx", "tokenizer.json", ALL_MINILM_DIMS)),
        _ => bail!(
            "Tract backend supports only all-minilm-l6-v2. Requested: '{}'",
            model_name
        ),
    }
}

fn cache_dir() -> Result<PathBuf> {
    let base = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let dir = PathBuf::from(base)
        .join(".cache")
        .join("ragdesk")
        .join("models");
    std::fs::create_dir_all(&dir).map_err(|e| anyhow::anyhow!("Create cache dir: {}", e))?;
    Ok(dir)
}

fn download_to_cache(repo: &str, path: &str, cache_path: &Path) -> Result<()> {
    if cache_path.exists() {
        return Ok(());
    }
    let url = format!(
        "https://huggingface.co/{}/resolve/main/{}",
        repo,
        path.replace(' ', "%20")
    );
    tracing::info!(%url, "downloading model file");
    let bytes = reqwest::blocking::get(&url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(|e| anyhow::anyhow!("Download {}: {}", url, e))?;
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Create cache parent: {}", e))?;
    }
    std::fs::write(cache_path, &bytes).map_err(|e| anyhow::anyhow!("Write cache: {}", e))?;
    Ok(())
}

impl TractEncoder {
    /// Fetch (if needed) and load the named model. Blocking.
    pub fn load(model_name: &str) -> Result<Self> {
        let (onnx_rel, tokenizer_rel, dims) = model_manifest(model_name)?;
        let model_dir = cache_dir()?.join(model_name);
        let onnx_path = model_dir.join(onnx_rel);
        let tokenizer_path = model_dir.join(tokenizer_rel);
        download_to_cache(ALL_MINILM_REPO, onnx_rel, &onnx_path)?;
        download_to_cache(ALL_MINILM_REPO, tokenizer_rel, &tokenizer_path)?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Load tokenizer: {}", e))?;

        let model = tract_onnx::onnx()
            .model_for_path(&onnx_path)
            .map_err(|e| anyhow::anyhow!("Load ONNX: {}", e))?
            .into_optimized()
            .map_err(|e| anyhow::anyhow!("Optimize: {}", e))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("Build tract runnable: {}", e))?;

        Ok(Self {
            tokenizer,
            run: Box::new(move |inputs| model.run(inputs)),
            dims,
        })
    }

    /// Embed `texts` in chunks of `batch_size`, returning L2-normalized vectors.
    pub fn encode(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size.max(1)) {
            let encodings: Vec<_> = chunk
                .iter()
                .map(|s| {
                    self.tokenizer
                        .encode(s.as_str(), true)
                        .map_err(|e| anyhow::anyhow!("Tokenize: {}", e))
                })
                .collect::<Result<Vec<_>>>()?;

            let max_len = encodings
                .iter()
                .map(|e| e.get_ids().len())
                .max()
                .unwrap_or(1)
                .clamp(1, DEFAULT_MAX_LEN);

            let rows = encodings.len();
            let mut input_ids = vec![0i64; rows * max_len];
            let mut attention_mask = vec![0i64; rows * max_len];

            for (i, enc) in encodings.iter().enumerate() {
                for (j, &id) in enc.get_ids().iter().take(max_len).enumerate() {
                    input_ids[i * max_len + j] = id as i64;
                    attention_mask[i * max_len + j] = 1;
                }
            }

            let input_ids: Tensor = ndarray::Array2::from_shape_vec((rows, max_len), input_ids)
                .map_err(|e| anyhow::anyhow!("Input ids shape: {}", e))?
                .into();
            let attention_mask: Tensor =
                ndarray::Array2::from_shape_vec((rows, max_len), attention_mask)
                    .map_err(|e| anyhow::anyhow!("Attention mask shape: {}", e))?
                    .into();

            let result = (self.run)(tvec!(input_ids.into(), attention_mask.into()))?;
            let output = result
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("No output tensor"))?;
            let view = output
                .to_array_view::<f32>()
                .map_err(|e| anyhow::anyhow!("Output to array: {}", e))?;

            // [batch, dims] is a pooled sentence embedding; [batch, seq, dims]
            // is last_hidden_state and gets mean-pooled over real tokens.
            let shape = view.shape();
            match shape.len() {
                2 => {
                    for i in 0..shape[0] {
                        let row = view.slice(ndarray::s![i, ..]);
                        all_embeddings.push(normalize_l2(row.iter().copied().collect()));
                    }
                }
                3 => {
                    let seq_len = shape[1];
                    for (i, enc) in encodings.iter().enumerate() {
                        let valid_len = enc.get_ids().len().min(seq_len).min(max_len);
                        let mut sum = vec![0f32; self.dims];
                        for j in 0..valid_len {
                            let token = view.slice(ndarray::s![i, j, ..]);
                            for (acc, &v) in sum.iter_mut().zip(token.iter()) {
                                *acc += v;
                            }
                        }
                        if valid_len > 0 {
                            for x in &mut sum {
                                *x /= valid_len as f32;
                            }
                        }
                        all_embeddings.push(normalize_l2(sum));
                    }
                }
                _ => bail!("Unexpected output shape: {:?}", shape),
            }
        }

        Ok(all_embeddings)
    }
}

fn normalize_l2(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-9 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_l2_unit_length() {
        let v = normalize_l2(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_l2_zero_vector_unchanged() {
        assert_eq!(normalize_l2(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_manifest_rejects_unknown_model() {
        assert!(model_manifest("bge-large-en-v1.5").is_err());
        assert_eq!(model_manifest("all-minilm-l6-v2").unwrap().2, 384);
    }
}

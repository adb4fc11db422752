//! services/api/src/adapters/similarity.rs
//!
//! Sentence similarity backed by an OpenAI-compatible `/v1/embeddings` endpoint.
//! Implements the `SentenceSimilarityService` port: the source sentence and the
//! candidates are embedded in one request and compared by cosine similarity.

use std::time::Duration;

use async_trait::async_trait;
use classroom_core::ports::{PortError, PortResult, SentenceSimilarityService};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct EmbeddingSimilarityAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl EmbeddingSimilarityAdapter {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Cosine similarity clamped to `[0, 1]`; zero-length vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[async_trait]
impl SentenceSimilarityService for EmbeddingSimilarityAdapter {
    #[instrument(skip(self, source, candidates), fields(model = %self.model, candidates = candidates.len()))]
    async fn similarity(&self, source: &str, candidates: &[String]) -> PortResult<Vec<f32>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut input = Vec::with_capacity(candidates.len() + 1);
        input.push(source);
        input.extend(candidates.iter().map(String::as_str));
        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::Unexpected(format!(
                        "embedding request timed out after {}s",
                        DEFAULT_TIMEOUT_SECS
                    ))
                } else {
                    PortError::Unexpected(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PortError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "embedding API error (HTTP {}): {}",
                status.as_u16(),
                message
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("invalid embedding response: {}", e)))?;
        parsed.data.sort_by_key(|d| d.index);

        if parsed.data.len() != candidates.len() + 1 {
            return Err(PortError::Unexpected(format!(
                "expected {} embeddings, got {}",
                candidates.len() + 1,
                parsed.data.len()
            )));
        }

        let (source_embedding, rest) = parsed.data.split_at(1);
        let scores: Vec<f32> = rest
            .iter()
            .map(|d| cosine_similarity(&source_embedding[0].embedding, &d.embedding))
            .collect();
        debug!(?scores, "Computed sentence similarity");
        Ok(scores)
    }
}

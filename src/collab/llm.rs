//! The LLM client collaborator: an opaque capability the degradation
//! coordinator wraps. The real runtime binding is out of scope; this
//! module provides a deterministic in-process stub for local/dev use
//! and for the coordinator's own tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sidecar_core::ModelPreset;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request timed out")]
    Timeout,
    #[error("llm runtime unavailable")]
    Unavailable,
    #[error("input rejected: {0}")]
    InputInvalid(String),
}

impl sidecar_degradation::DownstreamFailure for LlmError {
    fn should_fallback(&self) -> bool {
        !matches!(self, LlmError::InputInvalid(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    pub target_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressResult {
    pub summary: String,
    pub ratio: f64,
    pub model: String,
    pub processing_time_ms: u64,
    pub quality: f64,
}

impl From<CompressResult> for Vec<u8> {
    fn from(value: CompressResult) -> Self {
        serde_json::to_vec(&value).expect("CompressResult always serializes")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResult {
    pub topics: Vec<String>,
    pub model: String,
}

impl From<TopicResult> for Vec<u8> {
    fn from(value: TopicResult) -> Self {
        serde_json::to_vec(&value).expect("TopicResult always serializes")
    }
}

/// Opaque LLM collaborator. `compress`/`extract_topics`/`test_models`
/// all take the governor's current [`ModelPreset`] so the caller can
/// trade latency for quality under load.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn compress(
        &self,
        content: &str,
        options: CompressOptions,
        preset: ModelPreset,
    ) -> Result<CompressResult, LlmError>;

    async fn extract_topics(&self, content: &str, max: usize, preset: ModelPreset) -> Result<TopicResult, LlmError>;

    async fn test_models(&self, content: &str, models: &[String]) -> Result<Vec<CompressResult>, LlmError>;
}

/// Deterministic stub: truncates content instead of calling a real
/// model, so tests and local runs don't depend on network access or a
/// model runtime.
pub struct StubLlmClient;

#[async_trait]
impl LlmClient for StubLlmClient {
    async fn compress(
        &self,
        content: &str,
        options: CompressOptions,
        preset: ModelPreset,
    ) -> Result<CompressResult, LlmError> {
        if content.is_empty() {
            return Err(LlmError::InputInvalid("content must not be empty".to_string()));
        }

        let ratio = options.target_ratio.unwrap_or(0.3).clamp(0.05, 0.95);
        let target_len = ((content.len() as f64) * ratio).ceil() as usize;
        let summary: String = content.chars().take(target_len.max(1)).collect();

        Ok(CompressResult {
            summary,
            ratio,
            model: model_name(preset),
            processing_time_ms: processing_time_ms(preset),
            quality: quality(preset),
        })
    }

    async fn extract_topics(&self, content: &str, max: usize, preset: ModelPreset) -> Result<TopicResult, LlmError> {
        if content.is_empty() {
            return Err(LlmError::InputInvalid("content must not be empty".to_string()));
        }

        let topics = content
            .split_whitespace()
            .filter(|word| word.len() > 4)
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|word| !word.is_empty())
            .take(max)
            .collect();

        Ok(TopicResult {
            topics,
            model: model_name(preset),
        })
    }

    async fn test_models(&self, content: &str, models: &[String]) -> Result<Vec<CompressResult>, LlmError> {
        let mut results = Vec::with_capacity(models.len());
        for model in models {
            let preset = match model.as_str() {
                "fast" => ModelPreset::Fast,
                "quality" => ModelPreset::Quality,
                _ => ModelPreset::Balanced,
            };
            results.push(
                self.compress(content, CompressOptions::default(), preset)
                    .await?,
            );
        }
        Ok(results)
    }
}

fn model_name(preset: ModelPreset) -> String {
    match preset {
        ModelPreset::Fast => "stub-fast-v1".to_string(),
        ModelPreset::Balanced => "stub-balanced-v1".to_string(),
        ModelPreset::Quality => "stub-quality-v1".to_string(),
    }
}

fn processing_time_ms(preset: ModelPreset) -> u64 {
    match preset {
        ModelPreset::Fast => 40,
        ModelPreset::Balanced => 120,
        ModelPreset::Quality => 400,
    }
}

fn quality(preset: ModelPreset) -> f64 {
    match preset {
        ModelPreset::Fast => 0.6,
        ModelPreset::Balanced => 0.8,
        ModelPreset::Quality => 0.95,
    }
}

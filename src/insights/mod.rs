//! Language-model insights
//!
//! Free-text fields generated from an already assembled profile:
//! - Health summary (score 0-100 with strengths and weaknesses)
//! - Social handle
//! - Entity analysis over the raw record sequence
//!
//! The model backend is injected as a [`Summarizer`] so callers decide which
//! client (or test stub) a request uses. Nothing in the profiling pipeline
//! depends on these outputs.

pub mod client;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::profile::{TransactionRecord, WalletProfile};

pub use client::LlmClient;

lazy_static::lazy_static! {
    /// Leading reasoning block some models emit before the answer
    static ref THINK_BLOCK: Regex = Regex::new(r"(?s)^<think>.*?</think>").unwrap();
}

/// Configuration for insight generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (falls back to OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,

    #[serde(default = "default_summary_model")]
    pub handle_model: String,
    #[serde(default = "default_handle_temperature")]
    pub handle_temperature: f32,
    #[serde(default = "default_handle_max_tokens")]
    pub handle_max_tokens: u32,

    #[serde(default = "default_entity_model")]
    pub entity_model: String,
    #[serde(default = "default_summary_temperature")]
    pub entity_temperature: f32,
    /// Records sent to the entity analysis prompt
    #[serde(default = "default_entity_sample")]
    pub entity_sample: usize,

    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_summary_model() -> String {
    "mistral-saba-24b".to_string()
}

fn default_entity_model() -> String {
    "qwen-qwq-32b".to_string()
}

fn default_summary_temperature() -> f32 {
    0.7
}

fn default_summary_max_tokens() -> u32 {
    2000
}

fn default_handle_temperature() -> f32 {
    0.9
}

fn default_handle_max_tokens() -> u32 {
    10
}

fn default_entity_sample() -> usize {
    100
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            api_key: String::new(),
            summary_model: default_summary_model(),
            summary_temperature: default_summary_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
            handle_model: default_summary_model(),
            handle_temperature: default_handle_temperature(),
            handle_max_tokens: default_handle_max_tokens(),
            entity_model: default_entity_model(),
            entity_temperature: default_summary_temperature(),
            entity_sample: default_entity_sample(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

/// A single-prompt completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Text completion backend
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Return the raw completion text for a prompt
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Language-model derived fields for a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInsights {
    pub health_summary: String,
    pub social_handle: String,
    pub entity_insights: Value,
}

/// Wallet profile with the insight fields attached at the top level
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedProfile {
    #[serde(flatten)]
    pub profile: WalletProfile,
    #[serde(flatten)]
    pub insights: WalletInsights,
}

/// Generates insights through an injected summarizer
pub struct InsightsGenerator {
    summarizer: Arc<dyn Summarizer>,
    config: InsightsConfig,
}

impl InsightsGenerator {
    pub fn new(summarizer: Arc<dyn Summarizer>, config: InsightsConfig) -> Self {
        Self { summarizer, config }
    }

    /// Health score and strengths/weaknesses for a profile
    pub async fn health_summary(&self, profile: &WalletProfile) -> Result<String> {
        let prompt = format!(
            "/no_think Given this wallet profile JSON, provide a concise health score (0–100) \
             and highlight strengths/weaknesses:  \n\n{}\n\nSummary:",
            serde_json::to_string(profile)?
        );
        let reply = self
            .summarizer
            .complete(CompletionRequest {
                model: self.config.summary_model.clone(),
                prompt,
                temperature: self.config.summary_temperature,
                max_tokens: Some(self.config.summary_max_tokens),
            })
            .await?;
        Ok(strip_think(&reply))
    }

    /// Wallet-themed social handle (no spaces)
    pub async fn social_handle(&self, profile: &WalletProfile) -> Result<String> {
        let prompt = format!(
            "/no_think Generate a unique, wallet-themed social handle (no spaces) for a user \
             based on this profile:\n\n{}\n\nHandle:",
            serde_json::to_string(profile)?
        );
        let reply = self
            .summarizer
            .complete(CompletionRequest {
                model: self.config.handle_model.clone(),
                prompt,
                temperature: self.config.handle_temperature,
                max_tokens: Some(self.config.handle_max_tokens),
            })
            .await?;
        Ok(strip_think(&reply))
    }

    /// Entities, usernames and patterns found in the transactions.
    ///
    /// A reply that is not valid JSON is returned as
    /// `{"error": "invalid JSON from LLM", "raw": <reply>}`.
    pub async fn entity_insights(&self, records: &[TransactionRecord]) -> Result<Value> {
        let sample = &records[..records.len().min(self.config.entity_sample)];
        let prompt = format!(
            "Given this JSON array of Aptos transactions, identify:\n\
             - prominent_entities (contracts, modules, addresses)\n\
             - usernames mentioned in arguments\n\
             - companies or organizations interacted with\n\
             - action_categories and any notable patterns\n\
             Return ONLY a JSON object with keys:\n  \
             'prominent_entities': [],\n  \
             'usernames': [],\n  \
             'companies': [],\n  \
             'action_categories': [],\n  \
             'insights': {{}}\n\n{}",
            serde_json::to_string(sample)?
        );
        let reply = self
            .summarizer
            .complete(CompletionRequest {
                model: self.config.entity_model.clone(),
                prompt,
                temperature: self.config.entity_temperature,
                max_tokens: None,
            })
            .await?;

        let cleaned = strip_think(&reply);
        debug!(len = cleaned.len(), "Entity analysis reply");
        Ok(parse_entity_reply(cleaned))
    }

    /// All three insights, requested concurrently
    pub async fn generate(
        &self,
        profile: &WalletProfile,
        records: &[TransactionRecord],
    ) -> Result<WalletInsights> {
        let (health_summary, social_handle, entity_insights) = tokio::try_join!(
            self.health_summary(profile),
            self.social_handle(profile),
            self.entity_insights(records),
        )?;

        Ok(WalletInsights {
            health_summary,
            social_handle,
            entity_insights,
        })
    }

    /// Generate insights and attach them to the profile they describe
    pub async fn enhance(
        &self,
        profile: WalletProfile,
        records: &[TransactionRecord],
    ) -> Result<EnhancedProfile> {
        let insights = self.generate(&profile, records).await?;
        Ok(EnhancedProfile { profile, insights })
    }
}

/// Remove a leading `<think>...</think>` block and surrounding whitespace
pub fn strip_think(content: &str) -> String {
    THINK_BLOCK.replace(content.trim(), "").trim().to_string()
}

fn parse_entity_reply(cleaned: String) -> Value {
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            warn!("Entity analysis returned invalid JSON: {}", e);
            serde_json::json!({ "error": "invalid JSON from LLM", "raw": cleaned })
        }
    }
}

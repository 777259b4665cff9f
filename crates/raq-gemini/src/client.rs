//! Gemini AI client implementation

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use raq_core::{
    AnswerGenerator, ClassifierProvider, Error, QueryExpander, RawClassification, Result,
    SearchStrategy,
};

use crate::config::GeminiConfig;

/// Gemini REST client serving classification, expansion, and generation
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    list_marker: Regex,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GeminiClient {
    /// Model constants
    pub const GEMINI_2_5_FLASH: &'static str = "gemini-2.5-flash";
    pub const GEMINI_2_5_PRO: &'static str = "gemini-2.5-pro";

    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let list_marker = Regex::new(r"^[\s*\-•\d.():]+")
            .map_err(|e| Error::Configuration(format!("invalid list-marker pattern: {e}")))?;

        Ok(Self {
            config,
            client,
            list_marker,
        })
    }

    /// Create a new Gemini client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// The model this client generates with
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Perform the actual generation request
    async fn perform_generation(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url, self.config.model
        );

        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Provider(format!(
                "Gemini API request failed with status {status}: {error_text}"
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let answer: String = data
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(Error::Provider(
                "Empty response from Gemini API".to_string(),
            ));
        }

        Ok(answer.trim().to_string())
    }

    /// Generate with the configured per-request deadline
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, prompt_len = prompt.len(), "calling Gemini");
        let generation_future = self.perform_generation(prompt);

        match timeout(self.config.timeout(), generation_future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("Gemini request timed out".to_string())),
        }
    }
}

/// Drop a surrounding markdown code fence, if any
fn strip_code_fences(text: &str) -> &str {
    let mut inner = text.trim();
    if let Some(start) = inner.find("```json") {
        inner = &inner[start + 7..];
    } else if let Some(start) = inner.find("```") {
        inner = &inner[start + 3..];
    }
    if let Some(end) = inner.find("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

/// Per-strategy instructions for the generation step
fn answer_prompt(strategy: SearchStrategy, query: &str, context: &str) -> String {
    let instructions = match strategy {
        SearchStrategy::General => {
            "You are a friendly assistant. Respond conversationally and helpfully, \
             in at most three sentences."
        }
        SearchStrategy::Vector => {
            "You are an assistant answering from retrieved documents. Give a detailed, \
             factual answer grounded in the excerpts below. If the excerpts do not \
             cover the question, say so."
        }
        SearchStrategy::KnowledgeGraph => {
            "You are an assistant answering from an entity-relationship knowledge base. \
             Focus on the relationships between the entities involved — who leads, owns, \
             invests in, or partners with whom — grounded in the excerpts below."
        }
        SearchStrategy::Hybrid => {
            "You are an assistant combining document content with entity relationships. \
             Answer comprehensively: cover both the relevant connections and the detailed \
             content, grounded in the excerpts below."
        }
    };

    if context.is_empty() {
        format!("{instructions}\n\nUser query: \"{query}\"")
    } else {
        format!("{instructions}\n\n{context}\nUser query: \"{query}\"")
    }
}

#[async_trait]
impl ClassifierProvider for GeminiClient {
    async fn classify_raw(&self, query: &str, rubric: &str) -> Result<RawClassification> {
        let prompt = format!("{rubric}\n\nUSER QUERY: \"{query}\"");
        let text = self.generate(&prompt).await?;

        let cleaned = strip_code_fences(&text);
        serde_json::from_str(cleaned).map_err(|e| {
            Error::Serialization(format!("classifier returned invalid JSON: {e}"))
        })
    }
}

#[async_trait]
impl QueryExpander for GeminiClient {
    async fn expand(&self, query: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Generate 3 semantically similar search queries for: \"{query}\". \
             Keep the meaning unchanged. Return one query per line with no \
             numbering and no commentary."
        );
        let text = self.generate(&prompt).await?;

        let variants = text
            .lines()
            .map(|line| self.list_marker.replace(line.trim(), "").trim().to_string())
            .filter(|line| line.len() > 5)
            .collect();
        Ok(variants)
    }
}

#[async_trait]
impl AnswerGenerator for GeminiClient {
    async fn answer(&self, strategy: SearchStrategy, query: &str, context: &str) -> Result<String> {
        let prompt = answer_prompt(strategy, query, context);
        self.generate(&prompt).await
    }
}

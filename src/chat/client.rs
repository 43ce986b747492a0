//! Ollama-backed question answering over the ingested records.
//!
//! The client sends one non-streaming chat request per question: a fixed
//! data-analyst system prompt plus a user prompt embedding the record set as
//! JSON. The serialized context is bounded to keep request sizes sane; when
//! records are cut off, the prompt says so explicitly rather than silently
//! analyzing a subset.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::StudentRecord;

/// Configuration for the assistant client.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Maximum records serialized into the prompt context.
    pub max_context_records: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 300,
            max_context_records: 500,
        }
    }
}

/// Message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// The question-answering client.
pub struct AssistantClient {
    config: AssistantConfig,
    http_client: reqwest::Client,
}

impl AssistantClient {
    /// Create a client for the configured Ollama endpoint.
    pub fn new(config: AssistantConfig) -> Self {
        info!(
            "Initializing assistant with model {} at {}",
            config.model_name, config.ollama_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Ask one question about the record set and return the raw answer text.
    ///
    /// Callers keep at most one question in flight per session; the chat
    /// loop awaits each answer before reading the next question.
    pub async fn ask(&self, question: &str, records: &[StudentRecord]) -> Result<String> {
        let url = format!("{}/api/chat", self.config.ollama_url);
        let prompt = build_prompt(question, records, self.config.max_context_records)?;

        let request = OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ANALYST_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Sending chat request for question: {}", question);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.config.ollama_url
                    )
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(chat_response.message.content)
    }
}

/// Build the user prompt: bounded JSON record context plus the question.
fn build_prompt(question: &str, records: &[StudentRecord], max_records: usize) -> Result<String> {
    let subset = &records[..records.len().min(max_records)];
    let context =
        serde_json::to_string_pretty(subset).context("Failed to serialize record context")?;

    let mut prompt = String::new();
    prompt.push_str("Here is the student data:\n");
    prompt.push_str(&context);

    if records.len() > max_records {
        prompt.push_str(&format!(
            "\n\nNote: The provided data is a subset of a larger dataset ({} total records) \
             and only the first {} records are being analyzed.",
            records.len(),
            max_records
        ));
    }

    prompt.push_str(&format!("\n\nUser's question: \"{question}\"\n"));
    Ok(prompt)
}

/// System prompt constraining the model to the provided data and to
/// Markdown tables for tabular answers.
const ANALYST_SYSTEM_PROMPT: &str = r#"You are a helpful data analyst assistant. Your task is to answer questions based strictly on the provided student data.
The data is in JSON format. Do not use any information outside of this data. If the answer cannot be found, say so.
Provide concise and accurate answers.

When you need to present data in a table, YOU MUST use Markdown table format.
For example:
| Student ID | Full Name | GPAX |
|------------|-----------|------|
| 65010001   | John Doe  | 3.50 |
| 65010002   | Jane Smith| 3.75 |

When asked to list students, provide their full name, student ID, and any other relevant information requested in a Markdown table."#;

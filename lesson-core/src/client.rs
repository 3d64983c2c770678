//! Chat-completion client and lesson JSON extraction

use crate::error::WeaveError;
use crate::models::{GenerationRequest, LessonPayload};
use crate::prompts::Prompt;
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use std::future::Future;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Anything that can turn a prompt into raw completion text.
pub trait CompletionService {
    fn complete(
        &self,
        request: &GenerationRequest,
        prompt: &Prompt,
    ) -> impl Future<Output = Result<String, WeaveError>> + Send;
}

/// OpenAI-compatible chat-completion client
#[derive(Clone, Debug)]
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: String,
    temperature: f32,
}

impl GenerationClient {
    pub fn new(endpoint: impl Into<String>, temperature: f32) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            temperature,
        }
    }

    fn request_body(&self, request: &GenerationRequest, prompt: &Prompt) -> Value {
        json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ],
            "temperature": self.temperature
        })
    }
}

impl CompletionService for GenerationClient {
    async fn complete(
        &self,
        request: &GenerationRequest,
        prompt: &Prompt,
    ) -> Result<String, WeaveError> {
        info!(
            "[generate] POST {} model={} words={}",
            self.endpoint,
            request.model,
            request.words.len()
        );
        debug!(
            "[generate] System prompt {} chars, user prompt {} chars",
            prompt.system.len(),
            prompt.user.len()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", request.credential))
            .header("Content-Type", "application/json")
            .json(&self.request_body(request, prompt))
            .send()
            .await
            .map_err(|e| {
                error!("[generate] Request failed: {}", e);
                WeaveError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!("[generate] Could not read error body: {}", e);
                String::new()
            });
            error!("[generate] API error ({}): {}", status, body);
            return Err(WeaveError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| WeaveError::MalformedResponse(format!("response body: {}", e)))?;

        completion_content(&response_json).map(str::to_string)
    }
}

/// `choices[0].message.content` of a chat-completion response
pub fn completion_content(response: &Value) -> Result<&str, WeaveError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| WeaveError::MalformedResponse("response has no message content".to_string()))
}

/// Parses completion text as JSON. Text that is not JSON on its own is
/// retried once with its fenced block: a block tagged `json` wins over an
/// untagged one. No other repair is attempted.
pub fn extract_json(content: &str) -> Result<Value, WeaveError> {
    if let Ok(value) = serde_json::from_str(content.trim()) {
        return Ok(value);
    }

    let inner = fenced_block(content).ok_or_else(|| {
        WeaveError::MalformedResponse("completion contains no JSON object".to_string())
    })?;

    serde_json::from_str(inner).map_err(|e| WeaveError::MalformedResponse(e.to_string()))
}

/// Interior of the first fenced block, preferring one tagged `json`
fn fenced_block(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    if let Some(start) = lower.find(JSON_FENCE) {
        let rest = &content[start + JSON_FENCE.len()..];
        return Some(until_closing_fence(rest));
    }

    let start = content.find(FENCE)?;
    let rest = &content[start + FENCE.len()..];
    // Drop an info string such as ```javascript on the opening line
    let rest = match rest.find('\n') {
        Some(newline) if !rest[..newline].trim_start().starts_with(['{', '[']) => {
            &rest[newline + 1..]
        }
        _ => rest,
    };
    Some(until_closing_fence(rest))
}

fn until_closing_fence(rest: &str) -> &str {
    rest.find(FENCE).map_or(rest, |end| &rest[..end]).trim()
}

/// Full extraction: completion text to a lesson payload
pub fn parse_lesson(content: &str) -> Result<LessonPayload, WeaveError> {
    let value = extract_json(content)?;
    serde_json::from_value(value).map_err(|e| WeaveError::MalformedResponse(e.to_string()))
}

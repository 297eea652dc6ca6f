use super::LlmClient;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Model families that reject an explicit sampling temperature.
const NO_TEMPERATURE_MODELS: &[&str] = &["o1", "o3", "o4-mini", "gpt-5"];

pub struct OpenAiClient {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, body: &serde_json::Value) -> anyhow::Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    async fn judge_inner(
        &self,
        model: &str,
        system_prompt: &str,
        instruction: &str,
    ) -> anyhow::Result<String> {
        let first = self
            .send(&request_body(
                model,
                system_prompt,
                instruction,
                supports_temperature(model),
            ))
            .await?;

        let resp = if first.status().is_success() {
            first
        } else {
            let status = first.status();
            let body = first.text().await.unwrap_or_default();
            if supports_temperature(model) && is_unsupported_temperature_error(&body) {
                // One retry without the sampling parameter; nothing else is retried.
                let retry = self
                    .send(&request_body(model, system_prompt, instruction, false))
                    .await?;
                if !retry.status().is_success() {
                    let status = retry.status();
                    let body = retry.text().await.unwrap_or_default();
                    anyhow::bail!("chat API error after temperature retry ({}): {}", status, body);
                }
                retry
            } else if is_unknown_model_error(status, &body) {
                anyhow::bail!("model '{}' is unknown or unavailable ({}): {}", model, status, body);
            } else {
                anyhow::bail!("chat API error ({}): {}", status, body);
            }
        };

        let val: serde_json::Value = resp.json().await?;
        val.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("chat API response missing content"))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn judge(
        &self,
        model: &str,
        system_prompt: &str,
        instruction: &str,
    ) -> anyhow::Result<String> {
        let fut = self.judge_inner(model, system_prompt, instruction);
        match timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_) => anyhow::bail!(
                "judge call to model '{}' timed out after {:?}",
                model,
                self.timeout
            ),
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

fn supports_temperature(model: &str) -> bool {
    !NO_TEMPERATURE_MODELS.iter().any(|m| model.contains(m))
}

fn request_body(
    model: &str,
    system_prompt: &str,
    instruction: &str,
    with_temperature: bool,
) -> serde_json::Value {
    let mut body = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system_prompt },
            { "role": "user", "content": instruction }
        ],
        "response_format": { "type": "json_object" }
    });
    if with_temperature {
        body["temperature"] = json!(0.0);
    }
    body
}

/// Structured match on the provider's error object, with a substring
/// fallback for providers that only echo a message.
fn is_unsupported_temperature_error(body: &str) -> bool {
    if let Ok(val) = serde_json::from_str::<serde_json::Value>(body) {
        let code = val.pointer("/error/code").and_then(|v| v.as_str());
        let param = val.pointer("/error/param").and_then(|v| v.as_str());
        if code == Some("unsupported_value") && param == Some("temperature") {
            return true;
        }
        if let Some(msg) = val.pointer("/error/message").and_then(|v| v.as_str()) {
            return msg.contains("temperature") && msg.contains("does not support");
        }
    }
    body.contains("temperature") && body.contains("does not support")
}

fn is_unknown_model_error(status: reqwest::StatusCode, body: &str) -> bool {
    if status == reqwest::StatusCode::NOT_FOUND {
        return true;
    }
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|val| {
            val.pointer("/error/code")
                .and_then(|c| c.as_str())
                .map(|c| c == "model_not_found")
        })
        .unwrap_or(false)
}

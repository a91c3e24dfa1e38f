use reqwest::Client;
use serde_json::json;
use std::env;
use thiserror::Error;

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, Provider};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Empty response: {0}")]
    EmptyResponse(String),
    /// Only produced by scripted providers.
    #[error("Provider failure: {0}")]
    Other(String),
}

impl Provider {
    pub fn openrouter(config: &AppConfig) -> Self {
        Self::OpenRouter {
            api_key: config.api_key_env_var.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            routing_only: config.routing_only.clone(),
            site_url: config.site_url.clone(),
            app_name: config.app_name.clone(),
            client: Client::new(),
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key: api_key_env_var_name,
                base_url,
                routing_only,
                site_url,
                app_name,
                client,
            } => {
                let actual_api_key = env::var(api_key_env_var_name)
                    .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))?;

                let url = format!("{base_url}/chat/completions");
                let mut request_payload = serde_json::to_value(&request)?;
                if !routing_only.is_empty() {
                    if let Some(obj) = request_payload.as_object_mut() {
                        obj.insert("provider".to_string(), json!({ "only": routing_only }));
                    }
                }

                tracing::debug!(model = %request.model, %url, "sending chat completion");
                let response = client
                    .post(&url)
                    .bearer_auth(actual_api_key)
                    .header("Content-Type", "application/json")
                    .header("HTTP-Referer", site_url)
                    .header("X-Title", app_name)
                    .json(&request_payload)
                    .send()
                    .await?;

                if response.status().is_success() {
                    Ok(response.json::<ChatCompletionResponse>().await?)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

/// Removes a surrounding ```json ... ``` (or bare ```) fence, if any.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// First choice's content, fence-stripped and parsed as JSON.
pub fn extract_json_content(
    response: &ChatCompletionResponse,
) -> Result<serde_json::Value, ApiConnectionError> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| ApiConnectionError::EmptyResponse("no choices in response".to_string()))?;
    tracing::debug!(raw = %choice.message.content, "raw model output");

    let content = strip_code_fences(&choice.message.content);
    if content.is_empty() {
        return Err(ApiConnectionError::EmptyResponse(
            "content is empty after stripping markdown".to_string(),
        ));
    }
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::endpoints::{
        ChatCompletionChoice, ChatCompletionResponseMessage,
    };

    fn response_with(content: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: "gen-1".to_string(),
            object: None,
            created: 0,
            model: "test".to_string(),
            choices: vec![ChatCompletionChoice {
                message: ChatCompletionResponseMessage {
                    role: "assistant".to_string(),
                    content: content.to_string(),
                },
                finish_reason: Some("stop".to_string()),
                index: 0,
            }],
            usage: None,
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```"), "```");
    }

    #[test]
    fn test_extract_json_content() {
        let fenced = response_with("```json\n{\"instructions\":\"1. Boil.\"}\n```");
        let value = extract_json_content(&fenced).unwrap();
        assert_eq!(value["instructions"], "1. Boil.");

        assert!(matches!(
            extract_json_content(&response_with("```json\n```")),
            Err(ApiConnectionError::EmptyResponse(_))
        ));
        assert!(matches!(
            extract_json_content(&response_with("Sure! Here is your recipe")),
            Err(ApiConnectionError::SerializationError(_))
        ));

        let mut empty = response_with("{}");
        empty.choices.clear();
        assert!(matches!(extract_json_content(&empty), Err(ApiConnectionError::EmptyResponse(_))));
    }
}

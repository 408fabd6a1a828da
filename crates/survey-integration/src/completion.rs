//! 外部抽取服务连接器
//!
//! 抽取服务被视为不可靠的黑盒分类器：调用可能失败，返回的文本也不保证符合约定结构。
//! 本模块只负责传输，结构校验由调用方完成。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use survey_core::{Result, SurveyError};
use tracing::{debug, warn};

/// 抽取服务接口
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// 以系统指令和用户输入调用服务，返回原始文本
    async fn complete(&self, prompt: &str, system_instruction: &str) -> Result<String>;
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Authentication {
    None,
    BearerToken { token: String },
    ApiKey { key: String, header: Option<String> },
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub base_url: String,
    pub authentication: Authentication,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI兼容的 chat-completions 客户端
pub struct ChatCompletionClient {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// 添加认证头
    fn add_auth_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.authentication {
            Authentication::None => request,
            Authentication::BearerToken { token } => request.bearer_auth(token),
            Authentication::ApiKey { key, header } => {
                let header_name = header.as_deref().unwrap_or("X-API-Key");
                request.header(header_name, key)
            }
        }
    }
}

/// 取出第一条候选回复的文本内容
fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| SurveyError::MalformedExtraction("no message content in completion".to_string()))
}

#[async_trait]
impl CompletionService for ChatCompletionClient {
    async fn complete(&self, prompt: &str, system_instruction: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system_instruction },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.config.temperature,
        };

        debug!("Sending completion request to {}", self.endpoint());
        let request = self.add_auth_headers(self.client.post(self.endpoint()).json(&body));

        let response = request
            .send()
            .await
            .map_err(|e| SurveyError::Service(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Completion service returned {}", response.status());
            return Err(SurveyError::Service(format!(
                "completion request failed: {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SurveyError::MalformedExtraction(e.to_string()))?;

        first_content(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> CompletionConfig {
        CompletionConfig {
            base_url: base_url.to_string(),
            authentication: Authentication::BearerToken { token: "secret".into() },
            model: "gpt-4o".into(),
            temperature: 0.7,
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = ChatCompletionClient::new(config("https://llm.example.com/v1/"));
        assert_eq!(client.endpoint(), "https://llm.example.com/v1/chat/completions");

        let client = ChatCompletionClient::new(config("https://llm.example.com/v1"));
        assert_eq!(client.endpoint(), "https://llm.example.com/v1/chat/completions");
    }

    #[test]
    fn test_first_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"diseases\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), r#"{"diseases":[]}"#);
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_content(response), Err(SurveyError::MalformedExtraction(_))));

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(first_content(response), Err(SurveyError::MalformedExtraction(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![
                ChatMessage { role: "system", content: "extract" },
                ChatMessage { role: "user", content: "malaria by gender" },
            ],
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "malaria by gender");
    }
}

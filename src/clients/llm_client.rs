/// LLM API 客户端
///
/// 封装所有与 LLM API 相关的调用逻辑：构建 chat-completion 请求、经重试编排器发送、取出回复文本。
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::clients::retry::RetryOrchestrator;
use crate::config::Config;
use crate::error::{QuizError, QuizResult};
use crate::infrastructure::{Transport, UpstreamRequest};

/// LLM 客户端
pub struct LlmClient<T> {
    orchestrator: RetryOrchestrator<T>,
    endpoint: String,
    api_key: Option<String>,
    model_name: String,
    temperature: f32,
}

impl<T: Transport> LlmClient<T> {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config, transport: T) -> Self {
        Self::with_orchestrator(config, RetryOrchestrator::new(transport, config.retry_policy()))
    }

    /// 使用自定义重试编排器创建（测试中注入等待函数）
    pub fn with_orchestrator(config: &Config, orchestrator: RetryOrchestrator<T>) -> Self {
        Self {
            orchestrator,
            endpoint: format!(
                "{}/chat/completions",
                config.llm_api_base_url.trim_end_matches('/')
            ),
            api_key: config.llm_api_key.clone(),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 发送聊天请求
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的回复文本（已去除首尾空白）
    pub async fn chat(&self, user_message: &str, system_message: Option<&str>) -> QuizResult<String> {
        let api_key = self.api_key.clone().ok_or(QuizError::MissingApiKey)?;

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let request = UpstreamRequest {
            url: self.endpoint.clone(),
            bearer_token: Some(api_key),
            body: self.build_request_body(user_message, system_message)?,
        };

        let response = self.orchestrator.call(&request).await?;

        debug!("LLM API 调用成功");

        extract_content(&response)
    }

    fn build_request_body(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> QuizResult<JsonValue> {
        let build_err = |e: async_openai::error::OpenAIError| QuizError::RequestBuild(e.to_string());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(build_err)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(build_err)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(build_err)?;

        serde_json::to_value(&request).map_err(|e| QuizError::RequestBuild(e.to_string()))
    }
}

/// 从 chat-completion 响应中取出第一条回复的文本
fn extract_content(response: &JsonValue) -> QuizResult<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(JsonValue::as_str)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| QuizError::malformed("LLM 返回内容为空", response.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::FutureExt;

    use super::*;
    use crate::clients::RetryPolicy;
    use crate::infrastructure::transport::mock::{chat_response, ScriptedTransport};
    use crate::infrastructure::UpstreamResponse;

    fn create_test_client(transport: ScriptedTransport, api_key: Option<&str>) -> LlmClient<ScriptedTransport> {
        let config = Config {
            llm_api_key: api_key.map(str::to_string),
            llm_api_base_url: "http://upstream.test/v1/".to_string(),
            ..Config::default()
        };
        let orchestrator = RetryOrchestrator::with_delay(
            transport,
            RetryPolicy::default(),
            Arc::new(|_: std::time::Duration| futures::future::ready(()).boxed()),
        );
        LlmClient::with_orchestrator(&config, orchestrator)
    }

    #[test]
    fn test_request_body_uses_chat_completion_shape() {
        let client = create_test_client(ScriptedTransport::always(chat_response("[]")), Some("k"));

        let body = client
            .build_request_body("Generate 2 questions", Some("Return JSON only"))
            .unwrap();

        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Return JSON only");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Generate 2 questions");
        assert_eq!(client.endpoint, "http://upstream.test/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_chat_returns_trimmed_content() {
        let transport = ScriptedTransport::always(chat_response("  [1, 2]\n"));
        let client = create_test_client(transport.clone(), Some("k"));

        let content = client.chat("hi", None).await.unwrap();

        assert_eq!(content, "[1, 2]");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_chat_without_api_key_never_calls_upstream() {
        let transport = ScriptedTransport::always(chat_response("[]"));
        let client = create_test_client(transport.clone(), None);

        let err = client.chat("hi", None).await.unwrap_err();

        assert!(matches!(err, QuizError::MissingApiKey));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let transport = ScriptedTransport::always(UpstreamResponse::new(200, r#"{"choices":[]}"#));
        let client = create_test_client(transport, Some("k"));

        let err = client.chat("hi", None).await.unwrap_err();

        assert!(matches!(err, QuizError::MalformedResponse { .. }));
    }
}

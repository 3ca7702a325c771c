//! HTTP 传输 - 基础设施层
//!
//! 只负责"把一个请求发出去并拿回状态码和响应体"，不关心重试、不解析内容。

use std::future::Future;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{QuizError, QuizResult};

/// 发往上游的请求
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: String,
    pub bearer_token: Option<String>,
    pub body: JsonValue,
}

/// 上游返回的原始响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// 出站传输能力
///
/// 网络层失败返回 [`QuizError::TransportFailure`]；只要拿到了 HTTP 响应（无论状态码）就返回 `Ok`。
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &UpstreamRequest,
    ) -> impl Future<Output = QuizResult<UpstreamResponse>> + Send;
}

/// 基于 reqwest 的传输实现
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &UpstreamRequest) -> QuizResult<UpstreamResponse> {
        debug!("POST {}", request.url);

        let mut builder = self.client.post(&request.url).json(&request.body);
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| QuizError::transport_failed(&request.url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| QuizError::transport_failed(&request.url, e))?;

        debug!("上游响应状态: {}, 响应体长度: {} 字节", status, body.len());

        Ok(UpstreamResponse { status, body })
    }
}

//! 错误类型
//!
//! 流水线内部统一使用 [`QuizError`]，HTTP 层再把它映射为响应（见 `api::rejections`）。

use thiserror::Error;

/// 出题与判分流水线的错误类型
#[derive(Debug, Error)]
pub enum QuizError {
    /// 网络层失败（连接失败、读取响应体失败等）
    #[error("网络请求失败 ({endpoint}): {source}")]
    TransportFailure {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 上游返回非 2xx 状态码（包括 429 限流）
    #[error("上游返回错误状态 {status}: {body}")]
    UpstreamHttpFailure { status: u16, body: String },

    /// 重试次数耗尽，携带最后一次观察到的错误
    #[error("上游调用失败，已尝试 {attempts} 次: {last}")]
    UpstreamExhausted {
        attempts: usize,
        #[source]
        last: Box<QuizError>,
    },

    /// AI 返回内容无法解析，或结构不符合题目格式
    #[error("AI 返回内容不合法: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// 调用方输入不合法
    #[error("{0}")]
    ValidationFailure(String),

    /// 未配置上游 API Key
    #[error("未配置 LLM API Key")]
    MissingApiKey,

    /// 构建上游请求体失败
    #[error("构建上游请求失败: {0}")]
    RequestBuild(String),
}

/// 账号服务错误
///
/// 文案直接返回给前端，保持英文。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing fields")]
    MissingFields,
    #[error("Username already exists")]
    UsernameTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

// ========== 便捷构造函数 ==========

impl QuizError {
    /// 创建网络层错误
    pub fn transport_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        QuizError::TransportFailure {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建 AI 返回内容不合法错误
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        QuizError::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// 创建参数校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        QuizError::ValidationFailure(message.into())
    }

    /// 是否属于重试编排器负责恢复的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuizError::TransportFailure { .. } | QuizError::UpstreamHttpFailure { .. }
        )
    }
}

// ========== Result 类型别名 ==========

/// 流水线结果类型
pub type QuizResult<T> = Result<T, QuizError>;

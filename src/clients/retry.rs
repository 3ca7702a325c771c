//! 重试编排器
//!
//! 有界重试 + 限流冷却。只对网络层和 HTTP 层失败重试，响应内容是否合法不归这里管。

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{QuizError, QuizResult};
use crate::infrastructure::{Transport, UpstreamRequest};
use crate::utils::truncate_text;

/// 可注入的等待函数，测试中替换为立即返回
pub type DelayFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最多尝试次数（含第一次），至少为 1
    pub max_attempts: usize,
    /// 网络错误或非 429 错误后的等待时间
    pub base_delay: Duration,
    /// 429 之后的冷却时间
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            rate_limit_cooldown: Duration::from_millis(2000),
        }
    }
}

/// 重试编排器
pub struct RetryOrchestrator<T> {
    transport: T,
    policy: RetryPolicy,
    delay: DelayFn,
}

impl<T: Transport> RetryOrchestrator<T> {
    /// 使用 tokio 计时器创建
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self::with_delay(transport, policy, Arc::new(|d: Duration| tokio::time::sleep(d).boxed()))
    }

    pub fn with_delay(transport: T, policy: RetryPolicy, delay: DelayFn) -> Self {
        Self {
            transport,
            policy,
            delay,
        }
    }

    /// 发送请求，成功时把响应体解析为 JSON 返回
    ///
    /// # 返回
    /// - 2xx：解析后的 JSON；响应体不是 JSON 时返回 `MalformedResponse`，不再重试
    /// - 所有尝试都失败：`UpstreamExhausted`，携带最后一次错误
    pub async fn call(&self, request: &UpstreamRequest) -> QuizResult<JsonValue> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let (error, wait) = match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    debug!("上游调用成功 (尝试 {}/{})", attempt, max_attempts);
                    return serde_json::from_str(&response.body).map_err(|e| {
                        QuizError::malformed(format!("上游响应体不是合法 JSON: {}", e), response.body)
                    });
                }
                Ok(response) if response.is_rate_limited() => {
                    warn!(
                        "上游请求频率限制 (尝试 {}/{}), 冷却 {:?}",
                        attempt, max_attempts, self.policy.rate_limit_cooldown
                    );
                    (
                        QuizError::UpstreamHttpFailure {
                            status: response.status,
                            body: response.body,
                        },
                        self.policy.rate_limit_cooldown,
                    )
                }
                Ok(response) => {
                    warn!(
                        "上游返回错误状态 {} (尝试 {}/{}): {}",
                        response.status,
                        attempt,
                        max_attempts,
                        truncate_text(&response.body, 200)
                    );
                    (
                        QuizError::UpstreamHttpFailure {
                            status: response.status,
                            body: response.body,
                        },
                        self.policy.base_delay,
                    )
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!("上游网络错误 (尝试 {}/{}): {}", attempt, max_attempts, e);
                    (e, self.policy.base_delay)
                }
            };

            if attempt >= max_attempts {
                warn!("上游调用失败，已重试 {} 次", max_attempts);
                return Err(QuizError::UpstreamExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            (self.delay)(wait).await;
        }
    }
}

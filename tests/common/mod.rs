use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use mock_test_generator::{
    router, AppState, Config, QuizResult, Transport, UpstreamRequest, UpstreamResponse,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// 按顺序返回预设响应的上游，用完后重复最后一个
#[derive(Clone)]
pub struct FakeUpstream {
    responses: Arc<Mutex<VecDeque<UpstreamResponse>>>,
    last: UpstreamResponse,
    calls: Arc<AtomicUsize>,
}

impl FakeUpstream {
    pub fn always(response: UpstreamResponse) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            last: response,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FakeUpstream {
    async fn send(&self, _request: &UpstreamRequest) -> QuizResult<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.last.clone()))
    }
}

pub fn chat_response(content: &str) -> UpstreamResponse {
    let body = json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    });
    UpstreamResponse::new(200, body.to_string())
}

pub const TWO_QUESTIONS: &str = r#"```json
[
  {"question": "What is LIFO?", "options": ["Stack", "Queue"], "correct": "Stack", "explanation": "Stack is LIFO."},
  {"question": "What is FIFO?", "options": ["Stack", "Queue"], "correct": "B", "explanation": "Queue is FIFO."}
]
```"#;

/// 不等待、带 API Key 的测试配置
pub fn test_config() -> Config {
    Config {
        llm_api_key: Some("test-key".to_string()),
        retry_delay_ms: 0,
        rate_limit_cooldown_ms: 0,
        ..Config::default()
    }
}

pub fn app(upstream: FakeUpstream) -> axum::Router {
    router(AppState::from_config(&test_config(), upstream))
}

pub async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .expect("request build should succeed");

    let response = app.clone().oneshot(request).await.expect("router should respond");
    read_json(response).await
}

async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

//! API 模块
//!
//! 负责对外暴露的 HTTP 接口，路由全部挂在 `/api` 下

pub mod handlers;
pub mod rejections;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::infrastructure::Transport;
use crate::services::{AuthService, GenerationCache, ResultStore};
use crate::workflow::TestGenerationService;

pub use handlers::FALLBACK_NOTE;
pub use rejections::ApiError;

/// 所有请求共享的状态，启动时创建一次
pub struct AppState<T> {
    pub generation: Arc<TestGenerationService<T>>,
    pub auth: Arc<AuthService>,
    pub results: Arc<ResultStore>,
    pub max_questions: u32,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation.clone(),
            auth: self.auth.clone(),
            results: self.results.clone(),
            max_questions: self.max_questions,
        }
    }
}

impl<T: Transport> AppState<T> {
    /// 按配置组装共享状态
    pub fn from_config(config: &Config, transport: T) -> Self {
        let cache = Arc::new(GenerationCache::new(config.cache_capacity(), config.cache_ttl()));
        let llm_client = LlmClient::new(config, transport);

        Self {
            generation: Arc::new(TestGenerationService::new(llm_client, cache)),
            auth: Arc::new(AuthService::new()),
            results: Arc::new(ResultStore::new()),
            max_questions: config.max_questions,
        }
    }
}

/// 构建路由
///
/// 允许任意来源跨域访问，前端页面可以和服务部署在不同端口
pub fn router<T: Transport + 'static>(state: AppState<T>) -> Router {
    Router::new()
        .route("/api/generate-test", post(handlers::generate_test::<T>))
        .route("/api/grade-test", post(handlers::grade_test::<T>))
        .route("/api/save-result", post(handlers::save_result::<T>))
        .route("/api/results", get(handlers::results::<T>))
        .route("/api/register", post(handlers::register::<T>))
        .route("/api/login", post(handlers::login::<T>))
        .route("/api/health", get(handlers::health::<T>))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! # Mock Test Generator
//!
//! 用 LLM 生成单选题测验并判分的 HTTP 服务
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有出站 HTTP 连接，只暴露 `Transport::send` 能力
//!
//! ### ② 客户端层（Clients）
//! - `RetryOrchestrator` - 有上限的重试策略（间隔、429 冷却）
//! - `LlmClient` - 构建 chat-completion 请求，取出回复文本
//!
//! ### ③ 业务能力层（Services）
//! - `normalize` / `matching_service` - 答案归一化与匹配
//! - `sanitizer` - 清洗并校验 AI 返回内容
//! - `GenerationCache` - 出题缓存，同键并发请求合并
//! - `AuthService` / `ResultStore` - 账号与成绩（内存实现）
//!
//! ### ④ 流程层（Workflow）
//! - `TestGenerationService` - 缓存 → LLM → 清洗 → 缓存，失败兜底
//! - `grade` - 逐题判分
//!
//! ### ⑤ 编排层（Orchestration）
//! - `App` - 创建共享状态，启动 HTTP 服务
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{router, AppState};
pub use config::Config;
pub use error::{AuthError, QuizError, QuizResult};
pub use infrastructure::{ReqwestTransport, Transport, UpstreamRequest, UpstreamResponse};
pub use models::{GenerationRequest, GradeReport, Question, SubmissionRecord};
pub use orchestrator::App;
pub use workflow::{grade, GenerationOutcome, TestGenerationService};

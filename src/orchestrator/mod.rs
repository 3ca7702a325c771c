//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 管理应用生命周期：读取配置后创建共享状态，启动 HTTP 服务。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (启动、持有共享状态)
//!     ↓
//! api (路由与请求解析)
//!     ↓
//! workflow (出题流程 / 判分流程)
//!     ↓
//! services + clients (能力层：缓存 / 清洗 / 匹配 / 重试)
//!     ↓
//! infrastructure (基础设施：Transport)
//! ```

pub mod app;

pub use app::App;

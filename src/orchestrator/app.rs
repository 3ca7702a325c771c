//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：打印启动信息，按配置组装共享状态（缓存、出题服务、账号、成绩）
//! 2. **运行服务**：绑定端口，启动 HTTP 服务直到进程退出
//!
//! 共享状态只在这里创建一次，之后以 `Arc` 句柄交给各个请求。

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::infrastructure::ReqwestTransport;
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
    state: AppState<ReqwestTransport>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let state = AppState::from_config(&config, ReqwestTransport::new());

        Ok(Self { config, state })
    }

    /// 运行 HTTP 服务
    pub async fn run(self) -> Result<()> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("绑定地址失败: {}", address))?;

        info!("✅ 服务已启动: http://{}", address);

        axum::serve(listener, api::router(self.state))
            .await
            .context("HTTP 服务异常退出")?;

        Ok(())
    }
}

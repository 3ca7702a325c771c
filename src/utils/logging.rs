/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// 优先读取 `RUST_LOG`，否则根据 `verbose` 选择默认级别。重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "info,mock_test_generator=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 模拟测试生成服务");
    info!("🌐 监听地址: http://{}", config.bind_address());
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!(
        "🔑 API Key: {}",
        if config.llm_api_key.is_some() {
            "已配置"
        } else {
            "未配置（将只返回备用题目）"
        }
    );
    info!(
        "🔁 重试: 最多 {} 次, 间隔 {}ms, 限流冷却 {}ms",
        config.max_retries, config.retry_delay_ms, config.rate_limit_cooldown_ms
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

use anyhow::Result;
use mock_test_generator::utils::logging;
use mock_test_generator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置（含 .env）
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run().await
}

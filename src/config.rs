use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::clients::RetryPolicy;

/// 程序配置
///
/// 加载顺序：默认值 → `QUIZ_CONFIG` 指向的 TOML 文件 → 环境变量（含 `.env`）。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    // --- 重试配置 ---
    /// 最多尝试次数（含第一次）
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    /// 429 限流后的冷却时间
    pub rate_limit_cooldown_ms: u64,
    // --- 缓存配置 ---
    /// 0 表示不限容量
    pub cache_capacity: usize,
    pub cache_ttl_secs: Option<u64>,
    /// 单次出题的题目数量上限
    pub max_questions: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            verbose_logging: false,
            llm_api_key: None,
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama-3.1-8b-instant".to_string(),
            llm_temperature: 0.2,
            max_retries: 3,
            retry_delay_ms: 1000,
            rate_limit_cooldown_ms: 2000,
            cache_capacity: 256,
            cache_ttl_secs: None,
            max_questions: 50,
        }
    }
}

impl Config {
    /// 完整加载配置：`.env`、可选的 TOML 文件、环境变量
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        match std::env::var("QUIZ_CONFIG") {
            Ok(path) => Ok(Self::from_toml_file(&path)?.with_env_overrides()),
            Err(_) => Ok(Self::from_env()),
        }
    }

    /// 只用默认值和环境变量构建配置
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    fn with_env_overrides(self) -> Self {
        let api_key = std::env::var("GROQ_API_KEY")
            .or_else(|_| std::env::var("LLM_API_KEY"))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            host: std::env::var("HOST").unwrap_or(self.host),
            port: env_parse("PORT").unwrap_or(self.port),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            llm_api_key: api_key.or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(self.llm_temperature),
            max_retries: env_parse("LLM_MAX_RETRIES").unwrap_or(self.max_retries),
            retry_delay_ms: env_parse("LLM_RETRY_DELAY_MS").unwrap_or(self.retry_delay_ms),
            rate_limit_cooldown_ms: env_parse("LLM_RATE_LIMIT_COOLDOWN_MS")
                .unwrap_or(self.rate_limit_cooldown_ms),
            cache_capacity: env_parse("CACHE_CAPACITY").unwrap_or(self.cache_capacity),
            cache_ttl_secs: env_parse("CACHE_TTL_SECS").or(self.cache_ttl_secs),
            max_questions: env_parse("MAX_QUESTIONS").unwrap_or(self.max_questions),
        }
    }

    /// 监听地址，形如 `127.0.0.1:3000`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            rate_limit_cooldown: Duration::from_millis(self.rate_limit_cooldown_ms),
        }
    }

    pub fn cache_capacity(&self) -> Option<usize> {
        (self.cache_capacity > 0).then_some(self.cache_capacity)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

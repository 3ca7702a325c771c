//! 出题流程 - 流程层
//!
//! 核心职责：把一个出题请求变成一组校验过的题目
//!
//! 流程顺序：
//! 1. 查缓存
//! 2. 未命中 → LLM（带重试）→ 清洗校验 → 写缓存
//! 3. 任何失败 → 备用题目（兜底，不写缓存）

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::LlmClient;
use crate::error::QuizResult;
use crate::infrastructure::Transport;
use crate::models::{GenerationRequest, Question};
use crate::services::{sanitize, GenerationCache};

const SYSTEM_INSTRUCTION: &str = r#"You are a quiz generator. Output strictly valid JSON and nothing else.
Structure: [ { "question": "...", "options": ["...", "...", "...", "..."], "correct": "...", "explanation": "..." } ]
Rules:
- "correct" must be copied exactly from one of the "options".
- Every question has exactly one correct option.
- No explanatory prose, no Markdown, no code fences. Return ONLY the raw JSON array."#;

/// 出题结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub questions: Vec<Question>,
    /// 是否返回的是备用题目
    pub served_from_fallback: bool,
}

/// 出题服务
///
/// - 编排 缓存 → LLM → 清洗 的顺序
/// - 决定何时兜底
/// - 错误只记录日志，不向调用方传播
pub struct TestGenerationService<T> {
    llm_client: LlmClient<T>,
    cache: Arc<GenerationCache>,
}

impl<T: Transport> TestGenerationService<T> {
    pub fn new(llm_client: LlmClient<T>, cache: Arc<GenerationCache>) -> Self {
        if !llm_client.has_credentials() {
            warn!("⚠️ 未配置 LLM API Key，所有出题请求都将返回备用题目");
        }
        Self { llm_client, cache }
    }

    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    /// 生成一组题目
    ///
    /// 永远返回可用的题目：上游或校验失败时返回备用题目，并把 `served_from_fallback` 置为 `true`。
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let key = request.cache_key();

        info!(
            "📝 出题请求: 主题 {:?}, 难度 {}, 数量 {}",
            request.topic, request.difficulty, request.count
        );

        let result = self
            .cache
            .get_or_try_insert_with(&key, || self.fetch_questions(request))
            .await;

        match result {
            Ok(questions) => GenerationOutcome {
                questions,
                served_from_fallback: false,
            },
            Err(e) => {
                error!("❌ 出题失败，返回备用题目: {}", e);
                GenerationOutcome {
                    questions: fallback_questions(),
                    served_from_fallback: true,
                }
            }
        }
    }

    async fn fetch_questions(&self, request: &GenerationRequest) -> QuizResult<Vec<Question>> {
        let (user_message, system_message) = build_messages(request);

        info!("🤖 正在调用 LLM 生成题目 (模型: {})...", self.llm_client.model_name());
        let content = self
            .llm_client
            .chat(&user_message, Some(&system_message))
            .await?;

        let questions = sanitize(&content)?;

        if questions.len() != request.count as usize {
            warn!(
                "LLM 返回 {} 题，与请求的 {} 题不一致",
                questions.len(),
                request.count
            );
        }

        info!("✓ 生成完成，共 {} 题", questions.len());
        Ok(questions)
    }
}

/// 构建出题消息
///
/// 返回 (user_message, system_message)
fn build_messages(request: &GenerationRequest) -> (String, String) {
    let user_message = format!(
        "Generate {} multiple choice questions about {} at {} level.",
        request.count, request.topic, request.difficulty
    );
    (user_message, SYSTEM_INSTRUCTION.to_string())
}

/// 备用题目，上游完全不可用时返回
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question::new(
            "What is LIFO?",
            &["Stack", "Queue", "Array"],
            "Stack",
            "Stack is LIFO: the last element pushed is the first one popped.",
        ),
        Question::new(
            "Which data structure serves elements in first-in, first-out order?",
            &["Stack", "Queue", "Binary tree", "Hash set"],
            "Queue",
            "A queue removes elements in the order they were added.",
        ),
        Question::new(
            "What is 2 + 2?",
            &["3", "4", "5", "6"],
            "4",
            "Basic arithmetic.",
        ),
    ]
}

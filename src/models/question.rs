use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{QuizError, QuizResult};

/// 单选题
///
/// 字段名与 AI 返回的 JSON 保持一致：`question` / `options` / `correct` / `explanation`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    /// 正确答案：选项原文、近似写法，或者选项字母（`A` 对应第一个选项）
    #[serde(rename = "correct")]
    pub correct_spec: String,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: &[&str],
        correct_spec: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_spec: correct_spec.into(),
            explanation: explanation.into(),
        }
    }
}

/// 难度
///
/// 除三个内置档位外，调用方可以传任意自定义难度。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Custom(s) => s,
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Custom(value.trim().to_string()),
        }
    }
}

impl From<&str> for Difficulty {
    fn from(value: &str) -> Self {
        Difficulty::from(value.to_string())
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 出题请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: u32,
}

impl GenerationRequest {
    /// 创建并校验出题请求
    ///
    /// # 参数
    /// - `max_count`: 题目数量上限（含）
    pub fn new(
        topic: impl Into<String>,
        difficulty: impl Into<Difficulty>,
        count: u32,
        max_count: u32,
    ) -> QuizResult<Self> {
        let topic = topic.into().trim().to_string();
        let difficulty = difficulty.into();

        if topic.is_empty() {
            return Err(QuizError::validation("topic is required"));
        }
        if difficulty.as_str().is_empty() {
            return Err(QuizError::validation("difficulty is required"));
        }
        if count == 0 || count > max_count {
            return Err(QuizError::validation(format!(
                "numQuestions must be between 1 and {}",
                max_count
            )));
        }

        Ok(Self {
            topic,
            difficulty,
            count,
        })
    }

    /// 缓存键：`主题-难度-数量`，不区分大小写
    pub fn cache_key(&self) -> String {
        format!("{}-{}-{}", self.topic, self.difficulty, self.count).to_lowercase()
    }
}

/// 反序列化题目数量：前端表单可能以字符串形式提交
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = Option<u32>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a string containing one")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("numQuestions out of range: {}", value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("numQuestions out of range: {}", value)))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| E::custom(format!("numQuestions is not a number: {}", value)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

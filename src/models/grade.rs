use serde::{Deserialize, Serialize};

/// 判定答案正确时命中的规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    Exact,
    Normalized,
    LetterIndex,
    OptionNormalized,
    None,
}

/// 一道题的作答记录，`selected_text` 为空表示未作答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub question_index: usize,
    #[serde(default)]
    pub selected_text: Option<String>,
}

impl SubmissionRecord {
    pub fn answered(question_index: usize, selected: impl Into<String>) -> Self {
        Self {
            question_index,
            selected_text: Some(selected.into()),
        }
    }

    pub fn unanswered(question_index: usize) -> Self {
        Self {
            question_index,
            selected_text: None,
        }
    }
}

/// 单题判分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeVerdict {
    pub question_index: usize,
    pub selected_text: Option<String>,
    pub is_correct: bool,
    pub match_strategy: MatchStrategy,
}

/// 整份试卷的判分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeReport {
    pub score: usize,
    pub total: usize,
    pub verdicts: Vec<GradeVerdict>,
}

impl GradeReport {
    /// 百分制得分，四舍五入；没有题目时为 0
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.score as f64 / self.total as f64 * 100.0).round() as u32
    }

    /// 按得分段给出的评语
    pub fn feedback(&self) -> &'static str {
        match self.percentage() {
            p if p >= 70 => "🎉 Great job!",
            p if p >= 50 => "👍 Good effort!",
            _ => "📚 Keep practicing!",
        }
    }
}

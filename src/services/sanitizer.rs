//! AI 返回内容清洗与校验 - 业务能力层
//!
//! 把模型的自由文本回复变成严格的题目列表；任何字段缺失都直接报错，不做"补全"。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{QuizError, QuizResult};
use crate::models::Question;
use crate::services::matching_service::resolve_correct_index;
use crate::utils::truncate_text;

/// Markdown 代码块围栏，带或不带语言标记（```json / ```）
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("code fence pattern is valid"));

/// 清洗并校验 AI 返回的文本
///
/// # 返回
/// 校验通过的题目列表（至少一题）；解析失败或结构不合法时返回 `MalformedResponse`，携带原始文本。
pub fn sanitize(raw_text: &str) -> QuizResult<Vec<Question>> {
    let stripped = CODE_FENCE.replace_all(raw_text, "");
    let cleaned = stripped.trim();

    let value: JsonValue = serde_json::from_str(cleaned).map_err(|e| {
        warn!("AI 返回内容不是合法 JSON: {}", truncate_text(raw_text, 120));
        QuizError::malformed(format!("JSON 解析失败: {}", e), raw_text)
    })?;

    let items = value
        .as_array()
        .ok_or_else(|| QuizError::malformed("顶层不是数组", raw_text))?;

    if items.is_empty() {
        return Err(QuizError::malformed("题目列表为空", raw_text));
    }

    let questions = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_question(index, item).map_err(|reason| QuizError::malformed(reason, raw_text)))
        .collect::<QuizResult<Vec<_>>>()?;

    for (index, question) in questions.iter().enumerate() {
        if resolve_correct_index(&question.correct_spec, &question.options).is_none() {
            warn!(
                "第 {} 题的正确答案 {:?} 无法对应到任何选项，该题判分将恒为错误",
                index + 1,
                question.correct_spec
            );
        }
    }

    debug!("AI 返回内容校验通过，共 {} 题", questions.len());

    Ok(questions)
}

/// 校验单个题目对象，失败时返回原因
fn parse_question(index: usize, item: &JsonValue) -> Result<Question, String> {
    let position = index + 1;
    let object = item
        .as_object()
        .ok_or_else(|| format!("第 {} 题不是对象", position))?;

    let text = non_empty_str(object.get("question"))
        .ok_or_else(|| format!("第 {} 题缺少题干 question", position))?;

    let options = object
        .get("options")
        .ok_or_else(|| format!("第 {} 题缺少 options 字段", position))?
        .as_array()
        .ok_or_else(|| format!("第 {} 题的 options 不是数组", position))?
        .iter()
        .map(|o| o.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| format!("第 {} 题的 options 含有非字符串元素", position))?;

    if options.len() < 2 {
        return Err(format!("第 {} 题的选项少于 2 个", position));
    }

    let correct_spec = non_empty_str(object.get("correct"))
        .ok_or_else(|| format!("第 {} 题缺少正确答案 correct", position))?;

    let explanation = match object.get("explanation") {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(_) => return Err(format!("第 {} 题的 explanation 不是字符串", position)),
    };

    Ok(Question {
        text: text.to_string(),
        options,
        correct_spec: correct_spec.to_string(),
        explanation,
    })
}

fn non_empty_str(value: Option<&JsonValue>) -> Option<&str> {
    value
        .and_then(JsonValue::as_str)
        .filter(|s| !s.trim().is_empty())
}

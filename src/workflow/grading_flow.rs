//! 判分流程 - 流程层
//!
//! 逐题调用答案匹配，汇总得分。题目顺序即判分结果顺序。

use std::collections::HashMap;

use tracing::debug;

use crate::models::{GradeReport, GradeVerdict, Question, SubmissionRecord};
use crate::services::matches;

/// 对一份作答判分
///
/// # 参数
/// - `questions`: 出题时返回的题目
/// - `submissions`: 作答记录，缺失的题目视为未作答；同一题多次提交时以最后一次为准，越界的下标忽略
///
/// # 返回
/// 得分、总题数以及逐题判分结果
pub fn grade(questions: &[Question], submissions: &[SubmissionRecord]) -> GradeReport {
    let mut selected_by_index: HashMap<usize, Option<&str>> = HashMap::new();
    for submission in submissions {
        if submission.question_index < questions.len() {
            selected_by_index.insert(submission.question_index, submission.selected_text.as_deref());
        } else {
            debug!("忽略越界的作答记录: 第 {} 题", submission.question_index);
        }
    }

    let verdicts: Vec<GradeVerdict> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = selected_by_index.get(&index).copied().flatten();
            let (is_correct, match_strategy) = matches(selected, &question.correct_spec, &question.options);
            GradeVerdict {
                question_index: index,
                selected_text: selected.map(str::to_string),
                is_correct,
                match_strategy,
            }
        })
        .collect();

    let score = verdicts.iter().filter(|v| v.is_correct).count();

    GradeReport {
        score,
        total: questions.len(),
        verdicts,
    }
}

/// 答案匹配服务
///
/// 判断提交的选项是否等价于正确答案。正确答案可能是选项原文、近似写法，或者选项字母。
/// 规则按顺序尝试，第一个命中的规则生效：
///
/// 1. `Exact`：与正确答案逐字相同
/// 2. `Normalized`：归一化后相同
/// 3. `LetterIndex`：正确答案是单个字母，且提交内容与该字母对应的选项逐字相同
/// 4. `OptionNormalized`：某个选项与正确答案归一化后相同，且提交内容与正确答案归一化后相同
///
/// 选项文本可能自带字母前缀（如 `"A. Stack"`），这里按完整选项文本比较，不做剥离。
use crate::models::MatchStrategy;
use crate::services::normalize::normalize;

/// 判断提交答案是否正确
///
/// # 参数
/// - `selected`: 提交的选项文本，`None` 表示未作答
/// - `correct_spec`: 正确答案
/// - `options`: 题目的全部选项
///
/// # 返回
/// 返回 (是否正确, 命中的规则)
pub fn matches(selected: Option<&str>, correct_spec: &str, options: &[String]) -> (bool, MatchStrategy) {
    let Some(selected) = selected else {
        return (false, MatchStrategy::None);
    };

    if selected == correct_spec {
        return (true, MatchStrategy::Exact);
    }

    let normalized_selected = normalize(selected);
    let normalized_spec = normalize(correct_spec);

    if !normalized_spec.is_empty() && normalized_selected == normalized_spec {
        return (true, MatchStrategy::Normalized);
    }

    if let Some(index) = letter_index(correct_spec, options) {
        if options[index] == selected {
            return (true, MatchStrategy::LetterIndex);
        }
    }

    if !normalized_spec.is_empty()
        && normalized_selected == normalized_spec
        && options.iter().any(|o| normalize(o) == normalized_spec)
    {
        return (true, MatchStrategy::OptionNormalized);
    }

    (false, MatchStrategy::None)
}

/// 解析正确答案对应的选项下标
///
/// 先找逐字相同的选项，再找归一化后相同的选项，最后才把单个字母当作选项序号。
pub fn resolve_correct_index(correct_spec: &str, options: &[String]) -> Option<usize> {
    if let Some(index) = options.iter().position(|o| o == correct_spec) {
        return Some(index);
    }

    let normalized_spec = normalize(correct_spec);
    if !normalized_spec.is_empty() {
        if let Some(index) = options.iter().position(|o| normalize(o) == normalized_spec) {
            return Some(index);
        }
    }

    letter_index(correct_spec, options)
}

/// 把单个字母解析为选项下标（`A`/`a` → 0）
///
/// 只有当没有任何选项本身等于这个字母时才按序号解释，否则 `"B"` 在选项 `["B", "C"]`
/// 中会同时指向两个选项。
fn letter_index(correct_spec: &str, options: &[String]) -> Option<usize> {
    let mut chars = correct_spec.trim().chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return None;
    };
    if !letter.is_ascii_alphabetic() {
        return None;
    }

    let normalized_spec = normalize(correct_spec);
    if options.iter().any(|o| normalize(o) == normalized_spec) {
        return None;
    }

    let index = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
    (index < options.len()).then_some(index)
}

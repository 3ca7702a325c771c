//! 答案文本归一化
//!
//! 纯函数，无副作用。`normalize(normalize(x)) == normalize(x)` 对任意输入成立。

/// 归一化答案文本
///
/// 依次：去掉首尾空白、转小写、把弯引号折叠成直引号、去掉标点（只保留字母数字和空白）、
/// 把连续空白压缩成一个空格。标点先于空白压缩去掉，保证幂等。
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_quote)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 可空版本，`None` 归一化为空字符串
pub fn normalize_optional(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

fn fold_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
        other => other,
    }
}

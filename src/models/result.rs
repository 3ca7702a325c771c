use serde::{Deserialize, Serialize};

/// 已保存的成绩记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResult {
    pub id: u64,
    pub username: String,
    pub topic: String,
    pub score: u32,
    pub total: u32,
    /// 本地时间，`%Y-%m-%d %H:%M:%S`
    pub date: String,
}

/// 待保存的成绩
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResult {
    pub username: String,
    pub topic: String,
    pub score: u32,
    pub total: u32,
}

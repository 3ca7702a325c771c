//! 成绩存储 - 外部协作方的内存实现
//!
//! 只追加、按用户查询，查询结果新的在前。

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{QuizError, QuizResult};
use crate::models::{NewResult, SavedResult};

/// 成绩存储
#[derive(Default)]
pub struct ResultStore {
    rows: Mutex<Vec<SavedResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存一条成绩，记录当前本地时间
    pub fn save(&self, result: NewResult) -> QuizResult<SavedResult> {
        if result.username.trim().is_empty() || result.topic.trim().is_empty() {
            return Err(QuizError::validation("Missing fields"));
        }
        if result.score > result.total {
            return Err(QuizError::validation("score cannot exceed total"));
        }

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let saved = SavedResult {
            id: rows.last().map_or(1, |row| row.id + 1),
            username: result.username,
            topic: result.topic,
            score: result.score,
            total: result.total,
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        rows.push(saved.clone());

        debug!(
            "保存成绩: {} | {} | {}/{}",
            saved.username, saved.topic, saved.score, saved.total
        );
        Ok(saved)
    }

    /// 查询某个用户的全部成绩，新的在前
    pub fn list_for(&self, username: &str) -> Vec<SavedResult> {
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        rows.iter()
            .rev()
            .filter(|row| row.username == username)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn new_result(username: &str, topic: &str, score: u32, total: u32) -> NewResult {
        NewResult {
            username: username.to_string(),
            topic: topic.to_string(),
            score,
            total,
        }
    }

    #[test]
    fn test_results_are_listed_newest_first_per_user() {
        let store = ResultStore::new();
        store.save(new_result("alice", "Stacks", 3, 5)).unwrap();
        store.save(new_result("bob", "Queues", 1, 2)).unwrap();
        store.save(new_result("alice", "Graphs", 4, 4)).unwrap();

        let rows = store.list_for("alice");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].topic, "Graphs");
        assert_eq!(rows[1].topic, "Stacks");
        assert!(rows[0].id > rows[1].id);
        assert!(store.list_for("nobody").is_empty());
    }

    #[test]
    fn test_invalid_results_are_rejected() {
        let store = ResultStore::new();
        assert_err!(store.save(new_result("", "Stacks", 1, 2)));
        assert_err!(store.save(new_result("alice", "  ", 1, 2)));
        assert_err!(store.save(new_result("alice", "Stacks", 3, 2)));
        assert_ok!(store.save(new_result("alice", "Stacks", 2, 2)));
    }
}

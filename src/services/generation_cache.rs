//! 出题结果缓存
//!
//! 进程启动时创建一次，以句柄形式交给出题流程，进程退出时随之释放。
//!
//! - 键：[`GenerationRequest::cache_key`](crate::models::GenerationRequest::cache_key)
//! - 容量可选上限，超出时淘汰最久未访问的条目
//! - 可选 TTL，过期条目在访问时移除
//! - 同一个键的并发未命中只会触发一次上游调用，其余请求等待并共享结果

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{QuizError, QuizResult};
use crate::models::Question;

/// 一次上游生成的结果，由等待同一个键的所有请求共享
pub type SharedOutcome = Result<Vec<Question>, Arc<QuizError>>;

type InFlight = watch::Receiver<Option<SharedOutcome>>;

struct CacheEntry {
    questions: Vec<Question>,
    inserted_at: Instant,
    last_access: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, InFlight>,
}

enum Lookup {
    Hit(Vec<Question>),
    /// 由当前请求执行生成，完成后通过 sender 通知等待者
    Lead(watch::Sender<Option<SharedOutcome>>),
    Wait(InFlight),
}

/// 出题结果缓存
pub struct GenerationCache {
    state: Mutex<CacheState>,
    capacity: Option<usize>,
    ttl: Option<Duration>,
}

impl GenerationCache {
    /// 创建缓存
    ///
    /// # 参数
    /// - `capacity`: 最多缓存的条目数，`None` 表示不限
    /// - `ttl`: 条目存活时间，`None` 表示永不过期
    pub fn new(capacity: Option<usize>, ttl: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity,
            ttl,
        }
    }

    /// 不限容量、永不过期
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    pub fn get(&self, key: &str) -> Option<Vec<Question>> {
        let mut state = self.lock();
        self.fresh_entry(&mut state, key)
    }

    pub fn put(&self, key: impl Into<String>, questions: Vec<Question>) {
        let mut state = self.lock();
        self.insert(&mut state, key.into(), questions);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 命中则直接返回，否则执行 `init` 并缓存成功结果
    ///
    /// 同一个键同时只有一个 `init` 在执行，其余请求等待并拿到同一个结果（成功或失败）。
    /// 失败结果不缓存，下一次请求会重新调用上游。
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: &str, init: F) -> SharedOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = QuizResult<Vec<Question>>>,
    {
        let mut init = Some(init);

        loop {
            match self.lookup_or_join(key) {
                Lookup::Hit(questions) => {
                    debug!("缓存命中: {}", key);
                    return Ok(questions);
                }
                Lookup::Wait(mut receiver) => {
                    debug!("等待进行中的生成: {}", key);
                    let outcome = receiver
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| value.clone());
                    if let Some(outcome) = outcome {
                        return outcome;
                    }
                    // 执行生成的请求中途被取消，重新查找
                }
                Lookup::Lead(sender) => {
                    let outcome = match init.take() {
                        Some(init) => init().await.map_err(Arc::new),
                        None => continue,
                    };

                    {
                        let mut state = self.lock();
                        if let Ok(questions) = &outcome {
                            self.insert(&mut state, key.to_string(), questions.clone());
                        }
                        state.in_flight.remove(key);
                    }

                    sender.send_replace(Some(outcome.clone()));
                    return outcome;
                }
            }
        }
    }

    fn lookup_or_join(&self, key: &str) -> Lookup {
        let mut state = self.lock();
        if let Some(questions) = self.fresh_entry(&mut state, key) {
            return Lookup::Hit(questions);
        }

        if let Some(receiver) = state.in_flight.get(key) {
            if receiver.has_changed().is_ok() {
                return Lookup::Wait(receiver.clone());
            }
        }

        let (sender, receiver) = watch::channel(None);
        state.in_flight.insert(key.to_string(), receiver);
        Lookup::Lead(sender)
    }

    fn fresh_entry(&self, state: &mut CacheState, key: &str) -> Option<Vec<Question>> {
        let now = Instant::now();
        let expired = state
            .entries
            .get(key)
            .is_some_and(|entry| self.is_expired(entry, now));
        if expired {
            debug!("缓存过期: {}", key);
            state.entries.remove(key);
            return None;
        }

        state.entries.get_mut(key).map(|entry| {
            entry.last_access = now;
            entry.questions.clone()
        })
    }

    fn insert(&self, state: &mut CacheState, key: String, questions: Vec<Question>) {
        let now = Instant::now();
        state.entries.insert(
            key,
            CacheEntry {
                questions,
                inserted_at: now,
                last_access: now,
            },
        );

        if self.ttl.is_some() {
            state.entries.retain(|_, entry| !self.is_expired(entry, now));
        }

        if let Some(capacity) = self.capacity {
            while state.entries.len() > capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_access)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        debug!("缓存已满，淘汰: {}", k);
                        state.entries.remove(&k);
                    }
                    None => break,
                }
            }
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(entry.inserted_at) >= ttl)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

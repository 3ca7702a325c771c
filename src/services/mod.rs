//! 业务能力层
//!
//! 每个模块只提供一种能力，不关心流程顺序。

pub mod auth;
pub mod generation_cache;
pub mod matching_service;
pub mod normalize;
pub mod result_store;
pub mod sanitizer;

pub use auth::AuthService;
pub use generation_cache::GenerationCache;
pub use matching_service::{matches, resolve_correct_index};
pub use normalize::normalize;
pub use result_store::ResultStore;
pub use sanitizer::sanitize;

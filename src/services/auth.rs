//! 账号服务 - 外部协作方的内存实现
//!
//! 只暴露 `register` / `login` 两个能力，密码以 argon2 哈希保存。

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, info};

use crate::error::AuthError;

/// 账号服务
#[derive(Default)]
pub struct AuthService {
    users: RwLock<HashMap<String, String>>,
}

impl AuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册新账号
    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let password_hash = hash_password(password)?;

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }
        users.insert(username.to_string(), password_hash);

        info!("✓ 新用户注册: {}", username);
        Ok(())
    }

    /// 登录，成功时返回规范化后的用户名
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let stored_hash = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned()
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &stored_hash) {
            debug!("用户 {} 密码错误", username);
            return Err(AuthError::InvalidPassword);
        }

        Ok(username.to_string())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

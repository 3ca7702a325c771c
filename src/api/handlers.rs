//! HTTP 处理函数
//!
//! 只做请求解析与响应组装，业务都委托给流程层和服务层。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use super::rejections::ApiError;
use super::AppState;
use crate::error::AuthError;
use crate::infrastructure::Transport;
use crate::models::question::deserialize_count;
use crate::models::{GenerationRequest, NewResult, Question, SubmissionRecord};
use crate::services::ResultStore;
use crate::workflow::grade;

/// 备用题目的提示信息
pub const FALLBACK_NOTE: &str = "Backup Mode";

type ApiResult = Result<Json<JsonValue>, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestBody {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub num_questions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GradeTestBody {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveResultBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub topic: String,
    pub score: u32,
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(default)]
    pub username: String,
}

/// `POST /api/generate-test`
pub async fn generate_test<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<GenerateTestBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;

    let topic = body
        .topic
        .ok_or_else(|| ApiError::BadRequest("topic is required".to_string()))?;
    let difficulty = body
        .difficulty
        .ok_or_else(|| ApiError::BadRequest("difficulty is required".to_string()))?;
    let count = body
        .num_questions
        .ok_or_else(|| ApiError::BadRequest("numQuestions is required".to_string()))?;

    let request = GenerationRequest::new(topic, difficulty, count, state.max_questions)?;
    let outcome = state.generation.generate(&request).await;

    if outcome.served_from_fallback {
        return Ok(Json(json!({
            "questions": outcome.questions,
            "note": FALLBACK_NOTE,
        })));
    }

    Ok(Json(json!({ "questions": outcome.questions })))
}

/// `POST /api/grade-test`
///
/// 带上 `username` 和 `topic` 时顺便保存成绩；保存失败只记日志，不影响判分结果。
pub async fn grade_test<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<GradeTestBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;

    let report = grade(&body.questions, &body.submissions);
    info!("📊 判分完成: {}/{} ({}%)", report.score, report.total, report.percentage());

    if let (Some(username), Some(topic)) = (body.username, body.topic) {
        let result = NewResult {
            username,
            topic,
            score: report.score as u32,
            total: report.total as u32,
        };
        spawn_save(state.results.clone(), result);
    }

    Ok(Json(json!({
        "score": report.score,
        "total": report.total,
        "percentage": report.percentage(),
        "feedback": report.feedback(),
        "verdicts": report.verdicts,
    })))
}

fn spawn_save(store: Arc<ResultStore>, result: NewResult) {
    tokio::spawn(async move {
        if let Err(e) = store.save(result) {
            warn!("⚠️ 成绩保存失败: {}", e);
        }
    });
}

/// `POST /api/save-result`
pub async fn save_result<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<SaveResultBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;

    state.results.save(NewResult {
        username: body.username,
        topic: body.topic,
        score: body.score,
        total: body.total,
    })?;

    Ok(Json(json!({ "success": true })))
}

/// `GET /api/results?username=...`
pub async fn results<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult {
    if query.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username is required".to_string()));
    }
    Ok(Json(json!(state.results.list_for(&query.username))))
}

/// `POST /api/register`
pub async fn register<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload.map_err(|_| AuthError::MissingFields)?;

    state.auth.register(&body.username, &body.password)?;

    Ok(Json(json!({ "success": true })))
}

/// `POST /api/login`
pub async fn login<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload.map_err(|_| AuthError::MissingFields)?;

    let username = state.auth.login(&body.username, &body.password)?;

    Ok(Json(json!({ "success": true, "username": username })))
}

/// `GET /api/health`
pub async fn health<T: Transport + 'static>(State(state): State<AppState<T>>) -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "cachedQuizzes": state.generation.cache().len(),
    }))
}

//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok" }`
//!
//! 로드밸런서나 컨테이너 헬스체크가 호출합니다.
//! 데이터베이스에 `SELECT 1`을 보내 연결 풀까지 살아 있는지 확인합니다.

use crate::{error::AppError, routes::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /health`: DB에 닿지 못하면 500 `database_error`.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(state.store.pool()).await?;

    Ok(Json(json!({
        "status": "ok",
        "database": "ok"
    })))
}

//! # 대시보드 API 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/dashboard/stats?min_attempts=5&min_rate=0.8&window_days=30` → `DashboardStats`
//! - `GET /api/v1/dashboard/recent-session` → 최근 세션 요약 또는 `null`

use crate::{
    db::Dashboard,
    error::AppError,
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};

/// 생략한 쿼리 파라미터는 `StatsParams`의 기본값을 씁니다.
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = Dashboard::new(&state.store).stats(params).await?;
    Ok(Json(stats))
}

/// 세션이 하나도 없으면 본문이 `null`입니다 (404 아님).
pub async fn recent_session(
    State(state): State<AppState>,
) -> Result<Json<Option<RecentSessionSummary>>, AppError> {
    let summary = Dashboard::new(&state.store).most_recent_session().await?;
    Ok(Json(summary))
}

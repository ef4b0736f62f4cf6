//! # 학습 API 라우트 핸들러
//!
//! 학습 활동 종류, 학습 세션, 세션 안의 단어 복습 기록을 다룹니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/study_activities | `list_activities` | 활동 목록 |
//! | POST | /api/v1/study_activities | `create_activity` | 활동 생성 |
//! | GET | /api/v1/study_activities/{id} | `get_activity` | 활동 조회 |
//! | PATCH | /api/v1/study_activities/{id} | `update_activity` | 활동 수정 |
//! | DELETE | /api/v1/study_activities/{id} | `delete_activity` | 활동 삭제 |
//! | GET | /api/v1/study_sessions | `list_sessions` | 세션 목록 |
//! | POST | /api/v1/study_sessions | `create_session` | 세션 시작 |
//! | GET | /api/v1/study_sessions/{id} | `get_session` | 세션 조회 |
//! | DELETE | /api/v1/study_sessions/{id} | `delete_session` | 세션 삭제 (복습 기록도 함께) |
//! | POST | /api/v1/study_sessions/{id}/complete | `complete_session` | 세션 완료 |
//! | GET | /api/v1/study_sessions/{id}/reviews | `list_session_reviews` | 세션의 복습 기록 |
//! | POST | /api/v1/study_sessions/{id}/reviews | `create_session_review` | 복습 기록 추가 |
//!
//! 세션은 수정(PATCH) 엔드포인트가 없습니다. 완료 처리만 가능합니다.

use crate::{
    db::{
        StudyActivityRepo, StudyActivitySortKey, StudySessionRepo, StudySessionSortKey,
        WordReviewRepo, WordReviewSortKey,
    },
    error::AppError,
    models::*,
    routes::{AppState, ListParams},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

// ── 학습 활동 ──

pub async fn list_activities(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<StudyActivitySortKey>(state.page_size)?;
    let activities = StudyActivityRepo::new(&state.store).get_multi(&page).await?;
    Ok(Json(json!({ "study_activities": activities })))
}

pub async fn create_activity(
    State(state): State<AppState>,
    Json(req): Json<CreateStudyActivityRequest>,
) -> Result<(StatusCode, Json<StudyActivity>), AppError> {
    let activity = StudyActivityRepo::new(&state.store).create(&req).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudyActivity>, AppError> {
    let activity = StudyActivityRepo::new(&state.store)
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("study_activity", &id))?;
    Ok(Json(activity))
}

pub async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudyActivityRequest>,
) -> Result<Json<StudyActivity>, AppError> {
    let activity = StudyActivityRepo::new(&state.store)
        .update(&id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("study_activity", &id))?;
    Ok(Json(activity))
}

/// 활동을 삭제해도 그 활동으로 진행한 세션은 남습니다 (`study_activity_id`가 null이 됨).
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudyActivity>, AppError> {
    let activity = StudyActivityRepo::new(&state.store)
        .remove(&id)
        .await?
        .ok_or_else(|| AppError::not_found("study_activity", &id))?;
    Ok(Json(activity))
}

// ── 학습 세션 ──

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<StudySessionSortKey>(state.page_size)?;
    let sessions = StudySessionRepo::new(&state.store).get_multi(&page).await?;
    Ok(Json(json!({ "study_sessions": sessions })))
}

/// `POST /study_sessions` + `{ "group_id": "...", "study_activity_id": "..." }`
///
/// 그룹이나 활동이 없으면 422 `referential_integrity`.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateStudySessionRequest>,
) -> Result<(StatusCode, Json<StudySession>), AppError> {
    let session = StudySessionRepo::new(&state.store).create(&req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudySession>, AppError> {
    let session = StudySessionRepo::new(&state.store)
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("study_session", &id))?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudySession>, AppError> {
    let session = StudySessionRepo::new(&state.store)
        .remove(&id)
        .await?
        .ok_or_else(|| AppError::not_found("study_session", &id))?;
    Ok(Json(session))
}

/// `POST /study_sessions/{id}/complete` → 완료된 세션. 이미 완료됐으면 409.
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudySession>, AppError> {
    let session = StudySessionRepo::new(&state.store).complete(&id).await?;
    Ok(Json(session))
}

// ── 복습 기록 ──

pub async fn list_session_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<WordReviewSortKey>(state.page_size)?;
    let reviews = WordReviewRepo::new(&state.store)
        .list_by_session(&id, &page)
        .await?;
    Ok(Json(json!({ "reviews": reviews })))
}

/// `POST /study_sessions/{id}/reviews` + `{ "word_id": "...", "correct": true }` → `201 Created`
///
/// 기록과 함께 단어의 정답/오답 카운터도 올라갑니다.
pub async fn create_session_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SessionReviewRequest>,
) -> Result<(StatusCode, Json<WordReview>), AppError> {
    let review = StudySessionRepo::new(&state.store)
        .add_review(&id, &req)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

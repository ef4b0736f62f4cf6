//! # 그룹 API 라우트 핸들러
//!
//! 그룹 CRUD와 단어-그룹 관계 관리를 위한 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/groups | `list_groups` | 그룹 목록 |
//! | POST | /api/v1/groups | `create_group` | 새 그룹 생성 |
//! | GET | /api/v1/groups/{id} | `get_group` | 그룹 조회 |
//! | PATCH | /api/v1/groups/{id} | `update_group` | 그룹 수정 |
//! | DELETE | /api/v1/groups/{id} | `delete_group` | 그룹 삭제 (연결과 세션도 함께) |
//! | GET | /api/v1/groups/by-name/{name} | `get_group_by_name` | 이름으로 조회 |
//! | GET | /api/v1/groups/{id}/words | `list_group_words` | 그룹의 단어 목록 |
//! | POST | /api/v1/groups/{id}/words | `attach_group_word` | 그룹에 단어 연결 |
//! | DELETE | /api/v1/groups/{id}/words/{word_id} | `detach_group_word` | 그룹에서 단어 해제 |
//! | GET | /api/v1/groups/{id}/study_sessions | `list_group_sessions` | 그룹의 학습 세션 목록 |

use crate::{
    db::{GroupRepo, GroupSortKey, StudySessionRepo, StudySessionSortKey, WordRepo, WordSortKey},
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

/// `GET /groups` → `{ "groups": [...] }` (각 그룹에 `words_count` 포함)
pub async fn list_groups(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<GroupSortKey>(state.page_size)?;
    let groups = GroupRepo::new(&state.store).get_multi(&page).await?;
    Ok(Json(json!({ "groups": groups })))
}

/// `POST /groups` + `{ "name": "...", "description": "..." }` → `201 Created`
///
/// 같은 이름의 그룹이 있으면 409 Conflict.
pub async fn create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let group = GroupRepo::new(&state.store).create(&req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    let group = GroupRepo::new(&state.store)
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("group", &id))?;
    Ok(Json(group))
}

/// `PATCH /groups/{id}`
///
/// `"description": null`을 보내면 설명을 지우고, 필드를 빼면 그대로 둡니다.
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, AppError> {
    let group = GroupRepo::new(&state.store)
        .update(&id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("group", &id))?;
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    let group = GroupRepo::new(&state.store)
        .remove(&id)
        .await?
        .ok_or_else(|| AppError::not_found("group", &id))?;
    Ok(Json(group))
}

pub async fn get_group_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Group>, AppError> {
    let group = GroupRepo::new(&state.store)
        .get_by_name(&name)
        .await?
        .ok_or_else(|| AppError::not_found("group", &name))?;
    Ok(Json(group))
}

/// `GET /groups/{id}/words?sort_by=toki_pona&order=desc` → `{ "words": [...] }`
pub async fn list_group_words(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<WordSortKey>(state.page_size)?;
    let words = WordRepo::new(&state.store).list_by_group(&id, &page).await?;
    Ok(Json(json!({ "words": words })))
}

/// `POST /groups/{id}/words` + `{ "word_id": "..." }` → 갱신된 그룹
///
/// 이미 연결된 단어를 다시 보내도 중복되지 않습니다.
pub async fn attach_group_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AttachWordRequest>,
) -> Result<Json<Group>, AppError> {
    let group = GroupRepo::new(&state.store)
        .attach_word(&id, &req.word_id)
        .await?;
    Ok(Json(group))
}

/// `DELETE /groups/{id}/words/{word_id}` → 갱신된 그룹
///
/// 연결이 없으면 404 `not_in_relation`.
/// 여러 경로 파라미터는 튜플로 추출합니다.
pub async fn detach_group_word(
    State(state): State<AppState>,
    Path((id, word_id)): Path<(String, String)>,
) -> Result<Json<Group>, AppError> {
    let group = GroupRepo::new(&state.store)
        .detach_word(&id, &word_id)
        .await?;
    Ok(Json(group))
}

/// `GET /groups/{id}/study_sessions` → `{ "study_sessions": [...] }`
pub async fn list_group_sessions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<StudySessionSortKey>(state.page_size)?;
    let sessions = StudySessionRepo::new(&state.store)
        .list_by_group(&id, &page)
        .await?;
    Ok(Json(json!({ "study_sessions": sessions })))
}

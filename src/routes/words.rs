//! # 단어 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/words | `list_words` | 단어 목록 (페이지/정렬) |
//! | POST | /api/v1/words | `create_word` | 새 단어 생성 (`group_id`가 있으면 그룹에도 연결) |
//! | GET | /api/v1/words/{id} | `get_word` | 단어 조회 |
//! | PATCH | /api/v1/words/{id} | `update_word` | 단어 수정 |
//! | DELETE | /api/v1/words/{id} | `delete_word` | 단어 삭제 |
//! | GET | /api/v1/words/by-toki-pona/{text} | `get_word_by_toki_pona` | 토키 포나 표기로 조회 |
//! | GET | /api/v1/words/{id}/groups | `list_word_groups` | 단어가 속한 그룹 목록 |
//! | POST | /api/v1/words/{id}/review | `record_word_review` | 정답/오답 카운터 증가 |

use crate::{
    db::{GroupSortKey, WordRepo, WordSortKey},
    error::AppError,
    models::*,
    routes::{AppState, ListParams},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// `POST /words` 본문. 단어 필드에 선택적으로 `group_id`가 붙습니다.
#[derive(Debug, Deserialize)]
pub struct NewWordBody {
    #[serde(flatten)]
    pub word: CreateWordRequest,
    pub group_id: Option<String>,
}

/// `GET /words?page=&limit=&sort_by=&order=` → `{ "words": [...] }`
pub async fn list_words(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<WordSortKey>(state.page_size)?;
    let words = WordRepo::new(&state.store).get_multi(&page).await?;
    Ok(Json(json!({ "words": words })))
}

/// `POST /words` → `201 Created`
///
/// `group_id`가 없는 그룹을 가리키면 422이고, 단어도 만들어지지 않습니다.
pub async fn create_word(
    State(state): State<AppState>,
    Json(body): Json<NewWordBody>,
) -> Result<(StatusCode, Json<Word>), AppError> {
    let word = WordRepo::new(&state.store)
        .create_in_group(&body.word, body.group_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(word)))
}

pub async fn get_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Word>, AppError> {
    let word = WordRepo::new(&state.store)
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("word", &id))?;
    Ok(Json(word))
}

/// `PATCH /words/{id}`: 보낸 필드만 바꿉니다. 카운터는 여기서 바꿀 수 없습니다.
pub async fn update_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateWordRequest>,
) -> Result<Json<Word>, AppError> {
    let word = WordRepo::new(&state.store)
        .update(&id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("word", &id))?;
    Ok(Json(word))
}

/// `DELETE /words/{id}` → 삭제된 단어
pub async fn delete_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Word>, AppError> {
    let word = WordRepo::new(&state.store)
        .remove(&id)
        .await?
        .ok_or_else(|| AppError::not_found("word", &id))?;
    Ok(Json(word))
}

pub async fn get_word_by_toki_pona(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> Result<Json<Word>, AppError> {
    let word = WordRepo::new(&state.store)
        .get_by_toki_pona(&text)
        .await?
        .ok_or_else(|| AppError::not_found("word", &text))?;
    Ok(Json(word))
}

/// `GET /words/{id}/groups` → `{ "groups": [...] }`
pub async fn list_word_groups(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.into_page::<GroupSortKey>(state.page_size)?;
    let groups = WordRepo::new(&state.store).groups_of(&id, &page).await?;
    Ok(Json(json!({ "groups": groups })))
}

/// `POST /words/{id}/review` + `{ "correct": true }` → 갱신된 단어
///
/// 세션 없이 카운터만 올립니다. 세션 안의 기록은
/// `POST /study_sessions/{id}/reviews`를 씁니다.
pub async fn record_word_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RecordReviewRequest>,
) -> Result<Json<Word>, AppError> {
    let word = WordRepo::new(&state.store)
        .record_review(&id, req.correct)
        .await?;
    Ok(Json(word))
}

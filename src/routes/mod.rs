//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 API 라우터 구성을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `words`: 단어 CRUD, 토키 포나 표기 조회, 복습 카운터
//! - `groups`: 그룹 CRUD, 단어 연결/해제
//! - `study`: 학습 활동, 학습 세션, 복습 기록
//! - `dashboard`: 학습 통계

pub mod dashboard;
pub mod groups;
pub mod health;
pub mod study;
pub mod words;

use crate::db::{PageRequest, SortKey, Store};
use crate::error::AppError;
use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `Store`는 내부적으로 Arc 기반 풀이라 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// `limit`이 없을 때 쓰는 페이지 크기
    pub page_size: i64,
}

/// 목록 API 공통 쿼리 파라미터
///
/// `?page=2&limit=20&sort_by=toki_pona&order=desc` 또는 `?skip=20&limit=20`
/// `page`와 `skip`은 함께 쓸 수 없습니다.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    /// 쿼리 파라미터를 검증된 `PageRequest`로 바꿉니다. 잘못된 값은 `Validation`.
    pub fn into_page<K: SortKey>(self, page_size: i64) -> Result<PageRequest<K>, AppError> {
        let limit = self.limit.unwrap_or(page_size);
        let page = match (self.page, self.skip) {
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "use either 'page' or 'skip', not both".to_string(),
                ))
            }
            (Some(page), None) => PageRequest::page(page, limit)?,
            (None, skip) => PageRequest::new(skip.unwrap_or(0), limit)?,
        };
        page.parse_sort(self.sort_by.as_deref(), self.order.as_deref())
    }
}

/// `/api/v1` 아래에 붙는 API 라우터를 만듭니다.
///
/// 경로 파라미터는 axum 0.8 문법(`{id}`)을 씁니다.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // 헬스체크 API (서버 상태 확인용)
        .route("/health", get(health::health_check))
        // 단어(Word) API
        .route("/words", get(words::list_words).post(words::create_word))
        .route(
            "/words/{id}",
            get(words::get_word)
                .patch(words::update_word)
                .delete(words::delete_word),
        )
        .route(
            "/words/by-toki-pona/{text}",
            get(words::get_word_by_toki_pona),
        )
        .route("/words/{id}/groups", get(words::list_word_groups))
        .route("/words/{id}/review", post(words::record_word_review))
        // 그룹(Group) API
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/groups/{id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/groups/by-name/{name}", get(groups::get_group_by_name))
        .route(
            "/groups/{id}/words",
            get(groups::list_group_words).post(groups::attach_group_word),
        )
        .route(
            "/groups/{id}/words/{word_id}",
            delete(groups::detach_group_word),
        )
        .route(
            "/groups/{id}/study_sessions",
            get(groups::list_group_sessions),
        )
        // 학습 활동 / 세션 / 복습 기록 API
        .route(
            "/study_activities",
            get(study::list_activities).post(study::create_activity),
        )
        .route(
            "/study_activities/{id}",
            get(study::get_activity)
                .patch(study::update_activity)
                .delete(study::delete_activity),
        )
        .route(
            "/study_sessions",
            get(study::list_sessions).post(study::create_session),
        )
        .route(
            "/study_sessions/{id}",
            get(study::get_session).delete(study::delete_session),
        )
        .route(
            "/study_sessions/{id}/complete",
            post(study::complete_session),
        )
        .route(
            "/study_sessions/{id}/reviews",
            get(study::list_session_reviews).post(study::create_session_review),
        )
        // 대시보드 API
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/recent-session", get(dashboard::recent_session))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::WordSortKey;

    #[test]
    fn page_and_limit_map_to_skip() {
        let params = ListParams {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        };
        let page: PageRequest<WordSortKey> = params.into_page(100).unwrap();
        assert_eq!(page.skip(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn missing_limit_uses_configured_page_size() {
        let page: PageRequest<WordSortKey> = ListParams::default().into_page(25).unwrap();
        assert_eq!(page.skip(), 0);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn page_and_skip_together_are_rejected() {
        let params = ListParams {
            page: Some(1),
            skip: Some(0),
            ..Default::default()
        };
        let result: Result<PageRequest<WordSortKey>, _> = params.into_page(100);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

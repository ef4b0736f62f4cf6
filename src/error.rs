//! # 에러 처리 모듈
//!
//! 저장소 계층과 HTTP 계층이 함께 쓰는 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 에러 종류(kind)와 문제가 된 식별자/필드를 함께 담습니다.
//!   호출자는 `match`로 종류별 처리를 강제받습니다.
//! - `IntoResponse` 구현: 에러를 HTTP 상태 코드와 JSON 본문으로 변환

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 저장소 함수는 "행 없음"을 `Ok(None)`으로 돌려주고,
/// 도메인 연산(연결, 복습 기록 등)에서 대상이 없으면 `NotFound`를 반환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// id 또는 고유 키로 찾은 행이 없음 (HTTP 404)
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// 외래키 필드가 존재하지 않는 행을 가리킴 (HTTP 422)
    #[error("{field} '{id}' does not reference an existing row")]
    ReferentialIntegrity { field: &'static str, id: String },

    /// 잘못된 입력: 정렬 키, 정렬 방향, 페이지 범위 등 (HTTP 400)
    /// 저장소에 접근하기 전에 거부됩니다.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 존재하지 않는 단어-그룹 연결을 해제하려 함 (HTTP 404)
    #[error("word '{word_id}' is not in group '{group_id}'")]
    NotInRelation { group_id: String, word_id: String },

    /// 고유 제약 위반, 이미 완료된 세션 등 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수 결과에 `?`를 쓰면 자동으로 이 variant로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// 에러 종류를 나타내는 짧은 코드. JSON 응답의 `error.code`로 쓰입니다.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "not_found",
            AppError::ReferentialIntegrity { .. } => "referential_integrity",
            AppError::Validation(_) => "validation_error",
            AppError::NotInRelation { .. } => "not_in_relation",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Database(_) => "database_error",
        }
    }

    /// INSERT/UPDATE 중 발생한 sqlx 에러를 분류합니다.
    ///
    /// 고유 제약(UNIQUE) 위반은 `Conflict`로 바꾸고, 나머지는 그대로 둡니다.
    ///
    /// 외래키는 쓰기 트랜잭션 안에서 미리 검사하므로(`ReferentialIntegrity`) 여기까지 온
    /// 외래키 위반은 검사가 빠진 경로입니다. SQLite는 어느 필드인지 알려주지 않으니
    /// 필드를 지어내지 않고 내부 오류로 남깁니다.
    pub(crate) fn from_write(err: sqlx::Error, resource: &'static str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("{resource} already exists"));
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Internal(format!(
                    "{resource} write violated a foreign key constraint: {db_err}"
                ));
            }
        }
        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match self {
            AppError::NotFound { .. } | AppError::NotInRelation { .. } => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::ReferentialIntegrity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "word 'abc' not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::not_found("word", "x"), StatusCode::NOT_FOUND),
            (
                AppError::ReferentialIntegrity {
                    field: "session_id",
                    id: "x".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                AppError::NotInRelation {
                    group_id: "g".into(),
                    word_id: "w".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                AppError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn not_found_message_names_resource_and_id() {
        let err = AppError::not_found("group", "01abc");
        assert_eq!(err.to_string(), "group '01abc' not found");
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn unchecked_foreign_key_violation_does_not_name_a_field() {
        let (store, _dir) = crate::db::store::test_store().await;

        let err = sqlx::query("INSERT INTO word_groups (word_id, group_id) VALUES ('w', 'g')")
            .execute(store.pool())
            .await
            .unwrap_err();

        let err = AppError::from_write(err, "word_group");
        assert_eq!(err.code(), "internal_error");
        assert!(err.to_string().contains("foreign key"));
    }

    #[tokio::test]
    async fn unique_violation_is_a_conflict() {
        let (store, _dir) = crate::db::store::test_store().await;
        let insert = "INSERT INTO groups (id, name) VALUES (?, 'Nature')";

        sqlx::query(insert).bind("a").execute(store.pool()).await.unwrap();
        let err = sqlx::query(insert)
            .bind("b")
            .execute(store.pool())
            .await
            .unwrap_err();

        assert!(matches!(
            AppError::from_write(err, "group"),
            AppError::Conflict(_)
        ));
    }
}

//! # 단어(Word) 모델 정의
//!
//! 토키 포나 어휘 하나와 그 요청 본문들입니다.
//!
//! ## 구조체 역할
//! - `Word`: `words` 테이블 한 행 (응답용)
//! - `CreateWordRequest`: 새 단어 생성 본문
//! - `UpdateWordRequest`: 단어 부분 수정 본문
//! - `RecordReviewRequest`: 세션 없이 정답/오답 카운터만 올리는 본문

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;

/// 단어 엔티티: DB의 `words` 테이블 한 행(row)에 대응합니다.
///
/// `correct_count` / `wrong_count`는 복습 기록 연산으로만 증가합니다.
/// 일반 수정(PATCH)으로는 바꿀 수 없습니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Word {
    /// 단어 고유 식별자 (UUIDv7)
    pub id: String,
    /// 토키 포나 표기 (예: "pona"). 고유값
    pub toki_pona: String,
    /// 영어 뜻 (예: "good")
    pub english: String,
    /// 자유 형식 정의/설명
    pub definition: String,
    /// 구성 요소 (예: 합성어의 어근). JSON 그대로 저장합니다.
    pub components: Json<Value>,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub created_at: String,
}

/// 단어 생성 요청: `POST /api/v1/words`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWordRequest {
    pub toki_pona: String,
    pub english: String,
    /// 생략하면 빈 문자열
    #[serde(default)]
    pub definition: Option<String>,
    /// 생략하면 `{}`
    #[serde(default)]
    pub components: Option<Value>,
}

impl CreateWordRequest {
    pub fn new(toki_pona: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            toki_pona: toki_pona.into(),
            english: english.into(),
            definition: None,
            components: None,
        }
    }

    pub fn definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }
}

/// 단어 수정 요청: `PATCH /api/v1/words/{id}`
///
/// 보낸 필드만 변경하고 나머지는 유지합니다. 명시적 `null`은 필드마다 다르게 처리합니다.
/// - `toki_pona`, `english`: 값이 꼭 있어야 하므로 `null`이면 검증 에러
/// - `definition`: `null`이면 빈 문자열로 되돌림
/// - `components`: `null`이면 `{}`로 되돌림
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWordRequest {
    #[serde(default, deserialize_with = "super::nullable")]
    pub toki_pona: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub english: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub definition: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub components: Option<Option<Value>>,
}

/// 카운터 기록 요청: `POST /api/v1/words/{id}/review`
#[derive(Debug, Deserialize)]
pub struct RecordReviewRequest {
    pub correct: bool,
}

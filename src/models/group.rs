//! # 그룹(Group) 모델 정의
//!
//! 그룹은 단어 묶음입니다 (예: "Basic Words"). 단어와는 다대다 관계이며
//! `word_groups` 연결 테이블로 이어집니다.

use serde::{Deserialize, Serialize};

/// 그룹 엔티티: `groups` 테이블 한 행 + 계산된 단어 수
///
/// `words_count`는 저장하지 않고 조회할 때마다 `word_groups`에서 셉니다.
/// 연결 테이블이 유일한 기준이므로 두 값이 어긋날 수 없습니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: String,
    /// 그룹 이름. 고유값
    pub name: String,
    pub description: Option<String>,
    pub words_count: i64,
    pub created_at: String,
}

/// 그룹 생성 요청: `POST /api/v1/groups`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateGroupRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// 그룹 수정 요청: `PATCH /api/v1/groups/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroupRequest {
    /// `null`은 검증 에러 (이름은 비울 수 없음)
    #[serde(default, deserialize_with = "super::nullable")]
    pub name: Option<Option<String>>,
    /// None = 필드 누락 (변경 안 함), Some(None) = null (설명 삭제), Some(Some(s)) = 새 설명
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
}

/// 그룹에 단어 연결 요청: `POST /api/v1/groups/{id}/words`
#[derive(Debug, Deserialize)]
pub struct AttachWordRequest {
    pub word_id: String,
}

//! # 학습 모델 정의
//!
//! 학습 흐름에 쓰이는 구조체들입니다.
//!
//! ## 학습 흐름
//! ```text
//! 1. 그룹을 골라 세션 시작       → StudySession (started_at 기록)
//! 2. 단어마다 맞힘/틀림 기록      → WordReview (+ 단어 카운터 증가)
//! 3. 세션 종료                   → completed_at 기록 (한 번만)
//! ```

use serde::{Deserialize, Serialize};

/// 학습 활동 종류: `study_activities` 테이블 (예: "Flashcards", "Listening")
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudyActivity {
    pub id: String,
    pub name: String,
    /// 활동을 실행하는 외부 앱 주소
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudyActivityRequest {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudyActivityRequest {
    #[serde(default, deserialize_with = "super::nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
}

/// 학습 세션: `study_sessions` 테이블 한 행
///
/// 생성 후에는 `completed_at`을 한 번 채우는 것 말고는 바뀌지 않습니다.
/// `completed_at`이 있으면 항상 `started_at` 이후입니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudySession {
    pub id: String,
    pub group_id: String,
    pub study_activity_id: Option<String>,
    /// 세션 시작 시각 (ISO 8601, DB 기본값)
    pub started_at: String,
    /// 세션 완료 시각. None이면 진행 중
    pub completed_at: Option<String>,
}

/// 세션 시작 요청: `POST /api/v1/study_sessions`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudySessionRequest {
    pub group_id: String,
    pub study_activity_id: Option<String>,
}

impl CreateStudySessionRequest {
    pub fn for_group(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            study_activity_id: None,
        }
    }
}

/// 단어 복습 기록: `word_reviews` 테이블 한 행. 생성 후 불변입니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WordReview {
    pub id: String,
    pub session_id: String,
    pub word_id: String,
    pub correct: bool,
    /// 문제를 낸 자료의 출처 주소 (예: 듣기 퀴즈의 영상)
    pub url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWordReviewRequest {
    pub session_id: String,
    pub word_id: String,
    pub correct: bool,
    pub url: Option<String>,
}

/// 세션 경로 아래에서 복습을 기록하는 요청: `POST /api/v1/study_sessions/{id}/reviews`
///
/// 세션 ID는 URL 경로에서 가져옵니다.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionReviewRequest {
    pub word_id: String,
    pub correct: bool,
    pub url: Option<String>,
}

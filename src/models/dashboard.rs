use serde::{Deserialize, Serialize};

/// 가장 최근 학습 세션과 그 세션의 정답/오답 수
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentSessionSummary {
    pub id: String,
    pub group_id: String,
    pub group_name: String,
    pub study_activity_id: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub correct_count: i64,
    pub wrong_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_vocabulary: i64,
    pub total_words_studied: i64,
    pub mastered_words: i64,
    pub success_rate: f64,
    pub total_sessions: i64,
    pub active_groups: i64,
}

/// 대시보드 통계의 기준값. 생략된 값은 기본값을 씁니다.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatsParams {
    #[serde(default = "StatsParams::default_min_attempts")]
    pub min_attempts: i64,
    #[serde(default = "StatsParams::default_min_rate")]
    pub min_rate: f64,
    #[serde(default = "StatsParams::default_window_days")]
    pub window_days: i64,
}

impl StatsParams {
    fn default_min_attempts() -> i64 {
        5
    }

    fn default_min_rate() -> f64 {
        0.8
    }

    fn default_window_days() -> i64 {
        30
    }
}

impl Default for StatsParams {
    fn default() -> Self {
        Self {
            min_attempts: Self::default_min_attempts(),
            min_rate: Self::default_min_rate(),
            window_days: Self::default_window_days(),
        }
    }
}

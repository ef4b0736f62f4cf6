//! # 대시보드 집계
//!
//! 학습 현황 통계를 계산하는 읽기 전용 쿼리들입니다. 어떤 함수도 상태를 바꾸지 않으며,
//! 빈 데이터베이스에서는 에러 대신 0을 돌려줍니다.
//!
//! 복습 통계(학습한 단어, 숙달 단어, 정답률)는 `word_reviews` 테이블을 기준으로 셉니다.

use crate::db::store::Store;
use crate::error::AppError;
use crate::models::{DashboardStats, RecentSessionSummary, StatsParams};
use chrono::{Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};

/// SQLite `strftime('%Y-%m-%dT%H:%M:%fZ')`와 같은 모양 (밀리초 3자리)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub struct Dashboard<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Dashboard<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { pool: store.pool() }
    }

    /// 전체 단어 수
    pub async fn total_vocabulary(&self) -> Result<i64, AppError> {
        let mut conn = self.pool.acquire().await?;
        total_vocabulary(&mut conn).await
    }

    /// 복습 기록이 하나라도 있는 단어 수
    pub async fn total_words_studied(&self) -> Result<i64, AppError> {
        let mut conn = self.pool.acquire().await?;
        total_words_studied(&mut conn).await
    }

    /// 복습 횟수가 `min_attempts` 이상이고 정답률이 `min_rate` 이상인 단어 수
    pub async fn mastered_words(&self, min_attempts: i64, min_rate: f64) -> Result<i64, AppError> {
        validate_mastery(min_attempts, min_rate)?;
        let mut conn = self.pool.acquire().await?;
        mastered_words(&mut conn, min_attempts, min_rate).await
    }

    /// 전체 복습 중 정답 비율. 복습이 없으면 0.0
    pub async fn overall_success_rate(&self) -> Result<f64, AppError> {
        let mut conn = self.pool.acquire().await?;
        overall_success_rate(&mut conn).await
    }

    pub async fn total_sessions(&self) -> Result<i64, AppError> {
        let mut conn = self.pool.acquire().await?;
        total_sessions(&mut conn).await
    }

    /// 호출 시점 기준 최근 `window_days`일 안에 세션이 시작된 그룹 수
    pub async fn active_groups(&self, window_days: i64) -> Result<i64, AppError> {
        let since = window_start(window_days)?;
        let mut conn = self.pool.acquire().await?;
        active_groups(&mut conn, since.as_deref()).await
    }

    /// 가장 늦게 시작한 세션과 그 세션의 정답/오답 수. 세션이 없으면 `None`.
    pub async fn most_recent_session(&self) -> Result<Option<RecentSessionSummary>, AppError> {
        let summary = sqlx::query_as::<_, RecentSessionSummary>(
            r#"
            SELECT s.id, s.group_id, g.name AS group_name, s.study_activity_id,
                   s.started_at, s.completed_at,
                   COALESCE(SUM(CASE WHEN r.correct = 1 THEN 1 ELSE 0 END), 0) AS correct_count,
                   COALESCE(SUM(CASE WHEN r.correct = 0 THEN 1 ELSE 0 END), 0) AS wrong_count
            FROM study_sessions s
            JOIN groups g ON g.id = s.group_id
            LEFT JOIN word_reviews r ON r.session_id = s.id
            GROUP BY s.id
            ORDER BY s.started_at DESC, s.id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await?;
        Ok(summary)
    }

    /// 모든 수치를 한 읽기 트랜잭션 안에서 계산합니다.
    /// 각 값이 같은 시점의 데이터를 보므로 서로 어긋나지 않습니다.
    pub async fn stats(&self, params: StatsParams) -> Result<DashboardStats, AppError> {
        validate_mastery(params.min_attempts, params.min_rate)?;
        let since = window_start(params.window_days)?;

        let mut tx = self.pool.begin().await?;
        let stats = DashboardStats {
            total_vocabulary: total_vocabulary(&mut tx).await?,
            total_words_studied: total_words_studied(&mut tx).await?,
            mastered_words: mastered_words(&mut tx, params.min_attempts, params.min_rate).await?,
            success_rate: overall_success_rate(&mut tx).await?,
            total_sessions: total_sessions(&mut tx).await?,
            active_groups: active_groups(&mut tx, since.as_deref()).await?,
        };
        tx.commit().await?;

        Ok(stats)
    }
}

fn validate_mastery(min_attempts: i64, min_rate: f64) -> Result<(), AppError> {
    if min_attempts < 1 {
        return Err(AppError::Validation(format!(
            "min_attempts must be >= 1 (got {min_attempts})"
        )));
    }
    if !(0.0..=1.0).contains(&min_rate) {
        return Err(AppError::Validation(format!(
            "min_rate must be between 0 and 1 (got {min_rate})"
        )));
    }
    Ok(())
}

/// 활동 기간의 시작 시각. 기간이 표현 범위를 넘으면 `None`(전체 기간)입니다.
fn window_start(window_days: i64) -> Result<Option<String>, AppError> {
    if window_days < 0 {
        return Err(AppError::Validation(format!(
            "window_days must be >= 0 (got {window_days})"
        )));
    }

    let since = Duration::try_days(window_days)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .map(|start| start.format(TIMESTAMP_FORMAT).to_string());
    Ok(since)
}

async fn total_vocabulary(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

async fn total_words_studied(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT word_id) FROM word_reviews")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

async fn mastered_words(
    conn: &mut SqliteConnection,
    min_attempts: i64,
    min_rate: f64,
) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM (
            SELECT word_id
            FROM word_reviews
            GROUP BY word_id
            HAVING COUNT(*) >= ? AND SUM(correct) * 1.0 / COUNT(*) >= ?
        )
        "#,
    )
    .bind(min_attempts)
    .bind(min_rate)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

async fn overall_success_rate(conn: &mut SqliteConnection) -> Result<f64, AppError> {
    let (total, correct): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(correct), 0) FROM word_reviews")
            .fetch_one(&mut *conn)
            .await?;

    if total == 0 {
        return Ok(0.0);
    }
    Ok(correct as f64 / total as f64)
}

async fn total_sessions(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_sessions")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

async fn active_groups(conn: &mut SqliteConnection, since: Option<&str>) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT group_id) FROM study_sessions WHERE ? IS NULL OR started_at >= ?",
    )
    .bind(since)
    .bind(since)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::groups::GroupRepo;
    use crate::db::store::test_store;
    use crate::db::study::StudySessionRepo;
    use crate::db::words::WordRepo;
    use crate::models::*;

    async fn review(store: &Store, session_id: &str, word_id: &str, correct: bool) {
        StudySessionRepo::new(store)
            .add_review(
                session_id,
                &SessionReviewRequest {
                    word_id: word_id.to_string(),
                    correct,
                    url: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_store_yields_zeros() {
        let (store, _dir) = test_store().await;
        let dashboard = Dashboard::new(&store);

        assert_eq!(dashboard.overall_success_rate().await.unwrap(), 0.0);
        assert!(dashboard.most_recent_session().await.unwrap().is_none());

        let stats = dashboard.stats(StatsParams::default()).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_vocabulary: 0,
                total_words_studied: 0,
                mastered_words: 0,
                success_rate: 0.0,
                total_sessions: 0,
                active_groups: 0,
            }
        );
    }

    #[tokio::test]
    async fn mastery_needs_enough_attempts_and_rate() {
        let (store, _dir) = test_store().await;
        let group = GroupRepo::new(&store)
            .create(&CreateGroupRequest::named("Basic Words"))
            .await
            .unwrap();
        let words = WordRepo::new(&store);
        let pona = words.create(&CreateWordRequest::new("pona", "good")).await.unwrap();
        let ike = words.create(&CreateWordRequest::new("ike", "bad")).await.unwrap();
        let session = StudySessionRepo::new(&store)
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();

        // pona: 정답 4 + 오답 1 = 5회, 80%
        for correct in [true, true, true, true, false] {
            review(&store, &session.id, &pona.id, correct).await;
        }
        // ike: 정답 3 + 오답 1 = 4회 (횟수 미달)
        for correct in [true, true, true, false] {
            review(&store, &session.id, &ike.id, correct).await;
        }

        let dashboard = Dashboard::new(&store);
        assert_eq!(dashboard.mastered_words(5, 0.8).await.unwrap(), 1);
        assert_eq!(dashboard.mastered_words(4, 0.75).await.unwrap(), 2);
        assert_eq!(dashboard.total_words_studied().await.unwrap(), 2);
        assert_eq!(dashboard.total_vocabulary().await.unwrap(), 2);

        let rate = dashboard.overall_success_rate().await.unwrap();
        assert!((rate - 7.0 / 9.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn most_recent_session_counts_its_reviews() {
        let (store, _dir) = test_store().await;
        let group = GroupRepo::new(&store)
            .create(&CreateGroupRequest::named("Basic Words"))
            .await
            .unwrap();
        let words = WordRepo::new(&store);
        let pona = words
            .create_in_group(&CreateWordRequest::new("pona", "good"), Some(&group.id))
            .await
            .unwrap();
        words
            .create_in_group(&CreateWordRequest::new("telo", "water"), Some(&group.id))
            .await
            .unwrap();

        let session = StudySessionRepo::new(&store)
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();
        review(&store, &session.id, &pona.id, true).await;
        review(&store, &session.id, &pona.id, false).await;

        let recent = Dashboard::new(&store)
            .most_recent_session()
            .await
            .unwrap()
            .expect("one session exists");
        assert_eq!(recent.id, session.id);
        assert_eq!(recent.group_name, "Basic Words");
        assert_eq!(recent.correct_count, 1);
        assert_eq!(recent.wrong_count, 1);
    }

    #[tokio::test]
    async fn active_groups_respects_window() {
        let (store, _dir) = test_store().await;
        let groups = GroupRepo::new(&store);
        let sessions = StudySessionRepo::new(&store);

        let recent = groups.create(&CreateGroupRequest::named("Nature")).await.unwrap();
        let stale = groups.create(&CreateGroupRequest::named("Colors")).await.unwrap();

        sessions
            .create(&CreateStudySessionRequest::for_group(&recent.id))
            .await
            .unwrap();
        sessions
            .create(&CreateStudySessionRequest::for_group(&recent.id))
            .await
            .unwrap();
        let old = sessions
            .create(&CreateStudySessionRequest::for_group(&stale.id))
            .await
            .unwrap();
        sqlx::query("UPDATE study_sessions SET started_at = ? WHERE id = ?")
            .bind("2001-01-01T00:00:00.000Z")
            .bind(&old.id)
            .execute(store.pool())
            .await
            .unwrap();

        let dashboard = Dashboard::new(&store);
        assert_eq!(dashboard.active_groups(30).await.unwrap(), 1);
        assert_eq!(dashboard.active_groups(i64::MAX).await.unwrap(), 2);
        assert_eq!(dashboard.total_sessions().await.unwrap(), 3);
        assert!(matches!(
            dashboard.active_groups(-1).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn stats_rejects_out_of_range_thresholds() {
        let (store, _dir) = test_store().await;
        let dashboard = Dashboard::new(&store);

        let params = StatsParams {
            min_rate: 1.5,
            ..StatsParams::default()
        };
        assert!(matches!(
            dashboard.stats(params).await,
            Err(AppError::Validation(_))
        ));
    }
}

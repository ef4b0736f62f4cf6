//! # 학습 저장소
//!
//! 학습 활동(StudyActivity), 학습 세션(StudySession), 단어 복습 기록(WordReview)을 다룹니다.
//!
//! 세션과 복습 기록은 만든 뒤 내용이 바뀌지 않으므로 `Update` 타입이
//! `Infallible`입니다. 세션은 `complete()`로 완료 시각만 한 번 채웁니다.
//!
//! ## 복습 기록과 단어 카운터
//! 복습 기록을 만들면 같은 트랜잭션에서 단어의 `correct_count` / `wrong_count`도
//! 1 올립니다. 둘 중 하나만 반영되는 일은 없습니다.

use crate::db::pagination::{unknown_sort_key, PageRequest, SortKey};
use crate::db::repository::{self, Entity, Reference, Repository, Scope, SqlValue};
use crate::db::store::{begin_write, Store};
use crate::db::words::bump_counter;
use crate::error::AppError;
use crate::models::*;
use sqlx::SqliteConnection;
use std::convert::Infallible;
use std::ops::Deref;
use std::str::FromStr;

// ============================================================
// 학습 활동
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyActivitySortKey {
    Id,
    Name,
}

impl FromStr for StudyActivitySortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(StudyActivitySortKey::Id),
            "name" => Ok(StudyActivitySortKey::Name),
            other => Err(unknown_sort_key(other, &["id", "name"])),
        }
    }
}

impl SortKey for StudyActivitySortKey {
    fn column(self) -> &'static str {
        match self {
            StudyActivitySortKey::Id => "t.id",
            StudyActivitySortKey::Name => "t.name",
        }
    }
}

const ACTIVITY_SELECT: &str = "SELECT t.id, t.name, t.url, t.description FROM study_activities t";

impl Entity for StudyActivity {
    const RESOURCE: &'static str = "study_activity";
    const TABLE: &'static str = "study_activities";
    const SELECT: &'static str = ACTIVITY_SELECT;

    type SortKey = StudyActivitySortKey;
    type Create = CreateStudyActivityRequest;
    type Update = UpdateStudyActivityRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn insert_values(input: &CreateStudyActivityRequest) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(input.name.clone())),
            ("url", SqlValue::NullableText(input.url.clone())),
            (
                "description",
                SqlValue::NullableText(input.description.clone()),
            ),
        ]
    }

    fn validate_update(patch: &UpdateStudyActivityRequest) -> Result<(), AppError> {
        repository::reject_null("name", &patch.name)
    }

    fn update_values(patch: &UpdateStudyActivityRequest) -> Vec<(&'static str, SqlValue)> {
        let mut values = Vec::new();
        if let Some(Some(name)) = &patch.name {
            values.push(("name", SqlValue::Text(name.clone())));
        }
        if let Some(url) = &patch.url {
            values.push(("url", SqlValue::NullableText(url.clone())));
        }
        if let Some(description) = &patch.description {
            values.push(("description", SqlValue::NullableText(description.clone())));
        }
        values
    }
}

pub struct StudyActivityRepo<'a> {
    base: Repository<'a, StudyActivity>,
}

impl<'a> Deref for StudyActivityRepo<'a> {
    type Target = Repository<'a, StudyActivity>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> StudyActivityRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<StudyActivity>, AppError> {
        let sql = format!("{ACTIVITY_SELECT} WHERE t.name = ?");
        let activity = sqlx::query_as::<_, StudyActivity>(&sql)
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(activity)
    }
}

// ============================================================
// 학습 세션
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudySessionSortKey {
    Id,
    GroupId,
    StartedAt,
    CompletedAt,
}

impl FromStr for StudySessionSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(StudySessionSortKey::Id),
            "group_id" => Ok(StudySessionSortKey::GroupId),
            "started_at" => Ok(StudySessionSortKey::StartedAt),
            "completed_at" => Ok(StudySessionSortKey::CompletedAt),
            other => Err(unknown_sort_key(
                other,
                &["id", "group_id", "started_at", "completed_at"],
            )),
        }
    }
}

impl SortKey for StudySessionSortKey {
    fn column(self) -> &'static str {
        match self {
            StudySessionSortKey::Id => "t.id",
            StudySessionSortKey::GroupId => "t.group_id",
            StudySessionSortKey::StartedAt => "t.started_at",
            StudySessionSortKey::CompletedAt => "t.completed_at",
        }
    }
}

const SESSION_SELECT: &str = r#"
    SELECT t.id, t.group_id, t.study_activity_id, t.started_at, t.completed_at
    FROM study_sessions t"#;

impl Entity for StudySession {
    const RESOURCE: &'static str = "study_session";
    const TABLE: &'static str = "study_sessions";
    const SELECT: &'static str = SESSION_SELECT;

    type SortKey = StudySessionSortKey;
    type Create = CreateStudySessionRequest;
    type Update = Infallible;

    fn id(&self) -> &str {
        &self.id
    }

    fn insert_values(input: &CreateStudySessionRequest) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("group_id", SqlValue::Text(input.group_id.clone())),
            (
                "study_activity_id",
                SqlValue::NullableText(input.study_activity_id.clone()),
            ),
        ]
    }

    fn update_values(patch: &Infallible) -> Vec<(&'static str, SqlValue)> {
        match *patch {}
    }

    fn create_references(input: &CreateStudySessionRequest) -> Vec<Reference> {
        let mut refs = vec![Reference::new("group_id", "groups", &input.group_id)];
        if let Some(activity_id) = &input.study_activity_id {
            refs.push(Reference::new(
                "study_activity_id",
                "study_activities",
                activity_id,
            ));
        }
        refs
    }
}

pub struct StudySessionRepo<'a> {
    base: Repository<'a, StudySession>,
}

impl<'a> Deref for StudySessionRepo<'a> {
    type Target = Repository<'a, StudySession>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> StudySessionRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    /// 그룹의 세션 목록. 그룹이 없으면 `NotFound`.
    pub async fn list_by_group(
        &self,
        group_id: &str,
        page: &PageRequest<StudySessionSortKey>,
    ) -> Result<Vec<StudySession>, AppError> {
        let mut tx = self.pool().begin().await?;
        repository::ensure_exists::<Group>(&mut tx, group_id).await?;

        let scope = Scope {
            clause: "WHERE t.group_id = ",
            value: group_id,
        };
        let sessions = repository::fetch_page::<StudySession>(&mut tx, Some(scope), page).await?;
        tx.commit().await?;

        Ok(sessions)
    }

    /// 세션을 완료 처리합니다.
    ///
    /// 완료 시각은 현재 시각이되 `started_at`보다 앞서지 않습니다.
    /// 이미 완료된 세션이면 `Conflict`.
    pub async fn complete(&self, id: &str) -> Result<StudySession, AppError> {
        let mut tx = begin_write(self.pool()).await?;

        let result = sqlx::query(
            r#"
            UPDATE study_sessions
            SET completed_at = MAX(started_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            WHERE id = ? AND completed_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let session = repository::ensure_exists::<StudySession>(&mut tx, id).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "study_session '{id}' is already completed"
            )));
        }
        tx.commit().await?;

        tracing::debug!(session_id = id, "study session completed");
        Ok(session)
    }

    /// 세션 안에서 단어 하나의 정답/오답을 기록합니다. 세션이 없으면 `NotFound`.
    pub async fn add_review(
        &self,
        session_id: &str,
        input: &SessionReviewRequest,
    ) -> Result<WordReview, AppError> {
        let mut tx = begin_write(self.pool()).await?;
        repository::ensure_exists::<StudySession>(&mut tx, session_id).await?;

        let request = CreateWordReviewRequest {
            session_id: session_id.to_string(),
            word_id: input.word_id.clone(),
            correct: input.correct,
            url: input.url.clone(),
        };
        let review = insert_review(&mut tx, &request).await?;
        tx.commit().await?;

        Ok(review)
    }
}

// ============================================================
// 단어 복습 기록
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordReviewSortKey {
    Id,
    WordId,
    Correct,
    CreatedAt,
}

impl FromStr for WordReviewSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(WordReviewSortKey::Id),
            "word_id" => Ok(WordReviewSortKey::WordId),
            "correct" => Ok(WordReviewSortKey::Correct),
            "created_at" => Ok(WordReviewSortKey::CreatedAt),
            other => Err(unknown_sort_key(
                other,
                &["id", "word_id", "correct", "created_at"],
            )),
        }
    }
}

impl SortKey for WordReviewSortKey {
    fn column(self) -> &'static str {
        match self {
            WordReviewSortKey::Id => "t.id",
            WordReviewSortKey::WordId => "t.word_id",
            WordReviewSortKey::Correct => "t.correct",
            WordReviewSortKey::CreatedAt => "t.created_at",
        }
    }
}

const REVIEW_SELECT: &str = r#"
    SELECT t.id, t.session_id, t.word_id, t.correct, t.url, t.created_at
    FROM word_reviews t"#;

impl Entity for WordReview {
    const RESOURCE: &'static str = "word_review";
    const TABLE: &'static str = "word_reviews";
    const SELECT: &'static str = REVIEW_SELECT;

    type SortKey = WordReviewSortKey;
    type Create = CreateWordReviewRequest;
    type Update = Infallible;

    fn id(&self) -> &str {
        &self.id
    }

    fn insert_values(input: &CreateWordReviewRequest) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("session_id", SqlValue::Text(input.session_id.clone())),
            ("word_id", SqlValue::Text(input.word_id.clone())),
            ("correct", SqlValue::Bool(input.correct)),
            ("url", SqlValue::NullableText(input.url.clone())),
        ]
    }

    fn update_values(patch: &Infallible) -> Vec<(&'static str, SqlValue)> {
        match *patch {}
    }

    fn create_references(input: &CreateWordReviewRequest) -> Vec<Reference> {
        vec![
            Reference::new("session_id", "study_sessions", &input.session_id),
            Reference::new("word_id", "words", &input.word_id),
        ]
    }
}

pub struct WordReviewRepo<'a> {
    base: Repository<'a, WordReview>,
}

impl<'a> Deref for WordReviewRepo<'a> {
    type Target = Repository<'a, WordReview>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> WordReviewRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    /// 복습 기록을 만들고 단어 카운터를 올립니다.
    ///
    /// 범용 `Repository::create`를 가립니다. 카운터 없이 기록만 남는 경로는 없습니다.
    pub async fn create(&self, input: &CreateWordReviewRequest) -> Result<WordReview, AppError> {
        let mut tx = begin_write(self.pool()).await?;
        let review = insert_review(&mut tx, input).await?;
        tx.commit().await?;
        Ok(review)
    }

    /// 세션의 복습 기록 목록. 세션이 없으면 `NotFound`.
    pub async fn list_by_session(
        &self,
        session_id: &str,
        page: &PageRequest<WordReviewSortKey>,
    ) -> Result<Vec<WordReview>, AppError> {
        let mut tx = self.pool().begin().await?;
        repository::ensure_exists::<StudySession>(&mut tx, session_id).await?;

        let scope = Scope {
            clause: "WHERE t.session_id = ",
            value: session_id,
        };
        let reviews = repository::fetch_page::<WordReview>(&mut tx, Some(scope), page).await?;
        tx.commit().await?;

        Ok(reviews)
    }
}

async fn insert_review(
    conn: &mut SqliteConnection,
    input: &CreateWordReviewRequest,
) -> Result<WordReview, AppError> {
    let review = repository::insert::<WordReview>(conn, input).await?;

    // 참조 검사를 통과했으므로 단어는 있어야 합니다.
    if !bump_counter(conn, &input.word_id, input.correct).await? {
        return Err(AppError::Internal(format!(
            "word '{}' vanished while recording a review",
            input.word_id
        )));
    }

    tracing::debug!(
        review_id = %review.id,
        session_id = %review.session_id,
        word_id = %review.word_id,
        correct = review.correct,
        "word review recorded"
    );
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::groups::GroupRepo;
    use crate::db::store::test_store;
    use crate::db::words::WordRepo;

    async fn group_and_word(store: &Store) -> (Group, Word) {
        let group = GroupRepo::new(store)
            .create(&CreateGroupRequest::named("Basic Words"))
            .await
            .unwrap();
        let word = WordRepo::new(store)
            .create_in_group(&CreateWordRequest::new("pona", "good"), Some(&group.id))
            .await
            .unwrap();
        (group, word)
    }

    #[tokio::test]
    async fn activity_crud_and_lookup_by_name() {
        let (store, _dir) = test_store().await;
        let repo = StudyActivityRepo::new(&store);

        let activity = repo
            .create(&CreateStudyActivityRequest {
                name: "Flashcards".into(),
                url: Some("http://localhost:8081".into()),
                description: None,
            })
            .await
            .unwrap();

        let found = repo.get_by_name("Flashcards").await.unwrap().unwrap();
        assert_eq!(found.id, activity.id);

        let patched = repo
            .update(
                &activity.id,
                &UpdateStudyActivityRequest {
                    url: Some(None),
                    description: Some(Some("sitelen pi nimi".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.name, "Flashcards");
        assert_eq!(patched.url, None);
        assert_eq!(patched.description.as_deref(), Some("sitelen pi nimi"));
    }

    #[tokio::test]
    async fn session_for_missing_group_is_rejected() {
        let (store, _dir) = test_store().await;
        let sessions = StudySessionRepo::new(&store);

        let err = sessions
            .create(&CreateStudySessionRequest::for_group("missing"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ReferentialIntegrity { field: "group_id", .. }
        ));
    }

    #[tokio::test]
    async fn session_with_missing_activity_is_rejected() {
        let (store, _dir) = test_store().await;
        let (group, _) = group_and_word(&store).await;
        let sessions = StudySessionRepo::new(&store);

        let err = sessions
            .create(&CreateStudySessionRequest {
                group_id: group.id.clone(),
                study_activity_id: Some("missing".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ReferentialIntegrity { field: "study_activity_id", .. }
        ));
    }

    #[tokio::test]
    async fn review_with_missing_session_leaves_no_orphan() {
        let (store, _dir) = test_store().await;
        let (_, word) = group_and_word(&store).await;
        let reviews = WordReviewRepo::new(&store);

        let err = reviews
            .create(&CreateWordReviewRequest {
                session_id: "missing".into(),
                word_id: word.id.clone(),
                correct: true,
                url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ReferentialIntegrity { field: "session_id", .. }
        ));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM word_reviews")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);

        let untouched = WordRepo::new(&store).get(&word.id).await.unwrap().unwrap();
        assert_eq!(untouched.correct_count, 0);
    }

    #[tokio::test]
    async fn reviews_bump_word_counters() {
        let (store, _dir) = test_store().await;
        let (group, word) = group_and_word(&store).await;
        let sessions = StudySessionRepo::new(&store);

        let session = sessions
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();

        for correct in [true, true, false] {
            sessions
                .add_review(
                    &session.id,
                    &SessionReviewRequest {
                        word_id: word.id.clone(),
                        correct,
                        url: None,
                    },
                )
                .await
                .unwrap();
        }

        let word = WordRepo::new(&store).get(&word.id).await.unwrap().unwrap();
        assert_eq!(word.correct_count, 2);
        assert_eq!(word.wrong_count, 1);

        let listed = WordReviewRepo::new(&store)
            .list_by_session(&session.id, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed.iter().filter(|r| r.correct).count(), 2);
    }

    #[tokio::test]
    async fn review_for_missing_word_is_rejected() {
        let (store, _dir) = test_store().await;
        let (group, _) = group_and_word(&store).await;
        let sessions = StudySessionRepo::new(&store);
        let session = sessions
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();

        let err = sessions
            .add_review(
                &session.id,
                &SessionReviewRequest {
                    word_id: "missing".into(),
                    correct: false,
                    url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ReferentialIntegrity { field: "word_id", .. }
        ));

        let err = sessions
            .add_review(
                "missing",
                &SessionReviewRequest {
                    word_id: "missing".into(),
                    correct: false,
                    url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::NotFound { resource: "study_session", .. }
        ));
    }

    #[tokio::test]
    async fn complete_once_then_conflict() {
        let (store, _dir) = test_store().await;
        let (group, _) = group_and_word(&store).await;
        let sessions = StudySessionRepo::new(&store);
        let session = sessions
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();
        assert!(session.completed_at.is_none());

        let done = sessions.complete(&session.id).await.unwrap();
        let completed_at = done.completed_at.expect("completed");
        assert!(completed_at >= done.started_at);

        let err = sessions.complete(&session.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = sessions.complete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn deleting_group_cascades_to_sessions_and_reviews() {
        let (store, _dir) = test_store().await;
        let (group, word) = group_and_word(&store).await;
        let sessions = StudySessionRepo::new(&store);
        let session = sessions
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();
        sessions
            .add_review(
                &session.id,
                &SessionReviewRequest {
                    word_id: word.id.clone(),
                    correct: true,
                    url: None,
                },
            )
            .await
            .unwrap();

        GroupRepo::new(&store).remove(&group.id).await.unwrap().unwrap();

        assert!(sessions.get(&session.id).await.unwrap().is_none());
        let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM word_reviews")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(reviews, 0);
    }

    #[tokio::test]
    async fn deleting_activity_detaches_sessions() {
        let (store, _dir) = test_store().await;
        let (group, _) = group_and_word(&store).await;
        let activities = StudyActivityRepo::new(&store);
        let sessions = StudySessionRepo::new(&store);

        let activity = activities
            .create(&CreateStudyActivityRequest {
                name: "Listening".into(),
                url: None,
                description: None,
            })
            .await
            .unwrap();
        let session = sessions
            .create(&CreateStudySessionRequest {
                group_id: group.id.clone(),
                study_activity_id: Some(activity.id.clone()),
            })
            .await
            .unwrap();

        activities.remove(&activity.id).await.unwrap().unwrap();

        let session = sessions.get(&session.id).await.unwrap().unwrap();
        assert_eq!(session.study_activity_id, None);
    }

    #[tokio::test]
    async fn sessions_listed_per_group() {
        let (store, _dir) = test_store().await;
        let (group, _) = group_and_word(&store).await;
        let other = GroupRepo::new(&store)
            .create(&CreateGroupRequest::named("Nature"))
            .await
            .unwrap();
        let sessions = StudySessionRepo::new(&store);

        let first = sessions
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();
        let second = sessions
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();
        sessions
            .create(&CreateStudySessionRequest::for_group(&other.id))
            .await
            .unwrap();

        let page = PageRequest::default()
            .parse_sort(Some("started_at"), Some("desc"))
            .unwrap();
        let listed: Vec<String> = sessions
            .list_by_group(&group.id, &page)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&first.id) && listed.contains(&second.id));

        let err = sessions
            .list_by_group("missing", &PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "group", .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reviews_are_all_recorded() {
        let (store, _dir) = test_store().await;
        let (group, word) = group_and_word(&store).await;
        let session = StudySessionRepo::new(&store)
            .create(&CreateStudySessionRequest::for_group(&group.id))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..40 {
            let store = store.clone();
            let session_id = session.id.clone();
            let word_id = word.id.clone();
            handles.push(tokio::spawn(async move {
                StudySessionRepo::new(&store)
                    .add_review(
                        &session_id,
                        &SessionReviewRequest {
                            word_id,
                            correct: true,
                            url: None,
                        },
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let word = WordRepo::new(&store).get(&word.id).await.unwrap().unwrap();
        assert_eq!(word.correct_count, 40);
        let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM word_reviews")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(reviews, 40);
    }
}

//! # 그룹 저장소
//!
//! 그룹 CRUD와 단어 연결(attach) / 해제(detach)를 담당합니다.
//!
//! ## 연결 규칙
//! - `word_groups`의 복합 기본키 `(word_id, group_id)`가 중복 연결을 막습니다.
//!   `INSERT OR IGNORE`를 쓰므로 같은 연결을 두 번 요청해도 안전합니다.
//! - 해제는 존재 확인과 DELETE를 한 트랜잭션에서 하고, 지워진 행 수로
//!   `NotInRelation` 여부를 판단합니다.
//! - `words_count`는 저장하지 않고 조회 시 연결 테이블에서 셉니다.

use crate::db::pagination::{unknown_sort_key, SortKey};
use crate::db::repository::{self, Entity, Repository, SqlValue};
use crate::db::store::{begin_write, Store};
use crate::error::AppError;
use crate::models::*;
use sqlx::SqliteConnection;
use std::ops::Deref;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSortKey {
    Id,
    Name,
    WordsCount,
    CreatedAt,
}

impl FromStr for GroupSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(GroupSortKey::Id),
            "name" => Ok(GroupSortKey::Name),
            "words_count" => Ok(GroupSortKey::WordsCount),
            "created_at" => Ok(GroupSortKey::CreatedAt),
            other => Err(unknown_sort_key(
                other,
                &["id", "name", "words_count", "created_at"],
            )),
        }
    }
}

impl SortKey for GroupSortKey {
    fn column(self) -> &'static str {
        match self {
            GroupSortKey::Id => "t.id",
            GroupSortKey::Name => "t.name",
            // SELECT 목록의 계산 컬럼 별칭
            GroupSortKey::WordsCount => "words_count",
            GroupSortKey::CreatedAt => "t.created_at",
        }
    }
}

// 서브쿼리 별칭 `c`는 목록 범위 조건의 `wg` 조인과 겹치지 않게 따로 둡니다.
const GROUP_SELECT: &str = r#"
    SELECT t.id, t.name, t.description,
           (SELECT COUNT(*) FROM word_groups c WHERE c.group_id = t.id) AS words_count,
           t.created_at
    FROM groups t"#;

impl Entity for Group {
    const RESOURCE: &'static str = "group";
    const TABLE: &'static str = "groups";
    const SELECT: &'static str = GROUP_SELECT;

    type SortKey = GroupSortKey;
    type Create = CreateGroupRequest;
    type Update = UpdateGroupRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn insert_values(input: &CreateGroupRequest) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(input.name.clone())),
            (
                "description",
                SqlValue::NullableText(input.description.clone()),
            ),
        ]
    }

    fn validate_update(patch: &UpdateGroupRequest) -> Result<(), AppError> {
        repository::reject_null("name", &patch.name)
    }

    fn update_values(patch: &UpdateGroupRequest) -> Vec<(&'static str, SqlValue)> {
        let mut values = Vec::new();
        if let Some(Some(name)) = &patch.name {
            values.push(("name", SqlValue::Text(name.clone())));
        }
        // Some(None)이면 설명을 NULL로 지웁니다.
        if let Some(description) = &patch.description {
            values.push(("description", SqlValue::NullableText(description.clone())));
        }
        values
    }
}

/// 그룹 도메인 저장소
pub struct GroupRepo<'a> {
    base: Repository<'a, Group>,
}

impl<'a> Deref for GroupRepo<'a> {
    type Target = Repository<'a, Group>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> GroupRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Group>, AppError> {
        let sql = format!("{GROUP_SELECT} WHERE t.name = ?");
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(group)
    }

    /// 단어를 그룹에 연결하고, 갱신된 `words_count`를 가진 그룹을 돌려줍니다.
    /// 이미 연결되어 있으면 아무것도 바꾸지 않습니다.
    pub async fn attach_word(&self, group_id: &str, word_id: &str) -> Result<Group, AppError> {
        let mut tx = begin_write(self.pool()).await?;

        repository::ensure_exists::<Group>(&mut tx, group_id).await?;
        repository::ensure_exists::<Word>(&mut tx, word_id).await?;
        let inserted = link_word(&mut tx, group_id, word_id).await?;

        let group = repository::ensure_exists::<Group>(&mut tx, group_id).await?;
        tx.commit().await?;

        tracing::debug!(group_id, word_id, inserted, "word attached");
        Ok(group)
    }

    /// 연결을 해제합니다. 연결이 없었으면 `NotInRelation`.
    pub async fn detach_word(&self, group_id: &str, word_id: &str) -> Result<Group, AppError> {
        let mut tx = begin_write(self.pool()).await?;

        repository::ensure_exists::<Group>(&mut tx, group_id).await?;
        repository::ensure_exists::<Word>(&mut tx, word_id).await?;

        let result = sqlx::query("DELETE FROM word_groups WHERE group_id = ? AND word_id = ?")
            .bind(group_id)
            .bind(word_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotInRelation {
                group_id: group_id.to_string(),
                word_id: word_id.to_string(),
            });
        }

        let group = repository::ensure_exists::<Group>(&mut tx, group_id).await?;
        tx.commit().await?;

        tracing::debug!(group_id, word_id, "word detached");
        Ok(group)
    }
}

/// 연결 행을 넣습니다. 새로 들어갔으면 `true`, 이미 있었으면 `false`.
pub(crate) async fn link_word(
    conn: &mut SqliteConnection,
    group_id: &str,
    word_id: &str,
) -> Result<bool, AppError> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO word_groups (word_id, group_id) VALUES (?, ?)")
            .bind(word_id)
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

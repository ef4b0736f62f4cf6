//! # 단어 저장소
//!
//! `words` 테이블에 대한 범용 CRUD에 더해, 단어 도메인 쿼리를 제공합니다.
//!
//! - `get_by_toki_pona`: 고유 필드로 조회
//! - `list_by_group`: 그룹에 속한 단어 목록 (get_multi와 같은 페이지/정렬 계약)
//! - `groups_of`: 단어가 속한 그룹 목록
//! - `create_in_group`: 단어 생성 + 그룹 연결을 한 트랜잭션으로
//! - `record_review`: 정답/오답 카운터를 원자적으로 1 증가

use crate::db::groups::{link_word, GroupSortKey};
use crate::db::pagination::{unknown_sort_key, PageRequest, SortKey};
use crate::db::repository::{self, Entity, Reference, Repository, Scope, SqlValue};
use crate::db::store::{begin_write, Store};
use crate::error::AppError;
use crate::models::*;
use serde_json::json;
use sqlx::SqliteConnection;
use std::ops::Deref;
use std::str::FromStr;

/// 단어 목록의 정렬 키 (허용 목록)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSortKey {
    Id,
    TokiPona,
    English,
    CorrectCount,
    WrongCount,
    CreatedAt,
}

impl WordSortKey {
    const NAMES: [&'static str; 6] = [
        "id",
        "toki_pona",
        "english",
        "correct_count",
        "wrong_count",
        "created_at",
    ];
}

impl FromStr for WordSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(WordSortKey::Id),
            "toki_pona" => Ok(WordSortKey::TokiPona),
            "english" => Ok(WordSortKey::English),
            "correct_count" => Ok(WordSortKey::CorrectCount),
            "wrong_count" => Ok(WordSortKey::WrongCount),
            "created_at" => Ok(WordSortKey::CreatedAt),
            other => Err(unknown_sort_key(other, &Self::NAMES)),
        }
    }
}

impl SortKey for WordSortKey {
    fn column(self) -> &'static str {
        match self {
            WordSortKey::Id => "t.id",
            WordSortKey::TokiPona => "t.toki_pona",
            WordSortKey::English => "t.english",
            WordSortKey::CorrectCount => "t.correct_count",
            WordSortKey::WrongCount => "t.wrong_count",
            WordSortKey::CreatedAt => "t.created_at",
        }
    }
}

const WORD_SELECT: &str = r#"
    SELECT t.id, t.toki_pona, t.english, t.definition, t.components,
           t.correct_count, t.wrong_count, t.created_at
    FROM words t"#;

impl Entity for Word {
    const RESOURCE: &'static str = "word";
    const TABLE: &'static str = "words";
    const SELECT: &'static str = WORD_SELECT;

    type SortKey = WordSortKey;
    type Create = CreateWordRequest;
    type Update = UpdateWordRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn insert_values(input: &CreateWordRequest) -> Vec<(&'static str, SqlValue)> {
        let components = input
            .components
            .clone()
            .unwrap_or_else(|| json!({}));

        vec![
            ("toki_pona", SqlValue::Text(input.toki_pona.clone())),
            ("english", SqlValue::Text(input.english.clone())),
            (
                "definition",
                SqlValue::Text(input.definition.clone().unwrap_or_default()),
            ),
            ("components", SqlValue::Text(components.to_string())),
        ]
    }

    fn validate_update(patch: &UpdateWordRequest) -> Result<(), AppError> {
        repository::reject_null("toki_pona", &patch.toki_pona)?;
        repository::reject_null("english", &patch.english)
    }

    fn update_values(patch: &UpdateWordRequest) -> Vec<(&'static str, SqlValue)> {
        let mut values = Vec::new();
        if let Some(Some(toki_pona)) = &patch.toki_pona {
            values.push(("toki_pona", SqlValue::Text(toki_pona.clone())));
        }
        if let Some(Some(english)) = &patch.english {
            values.push(("english", SqlValue::Text(english.clone())));
        }
        // null은 생성 시 기본값으로 되돌립니다.
        if let Some(definition) = &patch.definition {
            let definition = definition.clone().unwrap_or_default();
            values.push(("definition", SqlValue::Text(definition)));
        }
        if let Some(components) = &patch.components {
            let components = components.clone().unwrap_or_else(|| json!({}));
            values.push(("components", SqlValue::Text(components.to_string())));
        }
        values
    }
}

/// 단어 도메인 저장소. 범용 연산(get, get_multi, create, update, remove)은
/// `Deref`로 내부 `Repository<Word>`에 위임합니다.
pub struct WordRepo<'a> {
    base: Repository<'a, Word>,
}

impl<'a> Deref for WordRepo<'a> {
    type Target = Repository<'a, Word>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> WordRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    /// 토키 포나 표기로 단어를 찾습니다.
    pub async fn get_by_toki_pona(&self, toki_pona: &str) -> Result<Option<Word>, AppError> {
        let sql = format!("{WORD_SELECT} WHERE t.toki_pona = ?");
        let word = sqlx::query_as::<_, Word>(&sql)
            .bind(toki_pona)
            .fetch_optional(self.pool())
            .await?;
        Ok(word)
    }

    /// 그룹에 속한 단어 목록. 그룹이 없으면 빈 목록이 아니라 `NotFound`입니다.
    pub async fn list_by_group(
        &self,
        group_id: &str,
        page: &PageRequest<WordSortKey>,
    ) -> Result<Vec<Word>, AppError> {
        let mut tx = self.pool().begin().await?;
        repository::ensure_exists::<Group>(&mut tx, group_id).await?;

        let scope = Scope {
            clause: "JOIN word_groups wg ON wg.word_id = t.id WHERE wg.group_id = ",
            value: group_id,
        };
        let words = repository::fetch_page::<Word>(&mut tx, Some(scope), page).await?;
        tx.commit().await?;

        Ok(words)
    }

    /// 단어가 속한 그룹 목록
    pub async fn groups_of(
        &self,
        word_id: &str,
        page: &PageRequest<GroupSortKey>,
    ) -> Result<Vec<Group>, AppError> {
        let mut tx = self.pool().begin().await?;
        repository::ensure_exists::<Word>(&mut tx, word_id).await?;

        let scope = Scope {
            clause: "JOIN word_groups wg ON wg.group_id = t.id WHERE wg.word_id = ",
            value: word_id,
        };
        let groups = repository::fetch_page::<Group>(&mut tx, Some(scope), page).await?;
        tx.commit().await?;

        Ok(groups)
    }

    /// 단어를 만들고, `group_id`가 주어지면 같은 트랜잭션에서 그룹에 연결합니다.
    ///
    /// 그룹이 없으면 `ReferentialIntegrity { field: "group_id" }`로 실패하고
    /// 단어도 만들어지지 않습니다.
    pub async fn create_in_group(
        &self,
        input: &CreateWordRequest,
        group_id: Option<&str>,
    ) -> Result<Word, AppError> {
        let mut tx = begin_write(self.pool()).await?;

        if let Some(group_id) = group_id {
            repository::verify_references(
                &mut tx,
                vec![Reference::new("group_id", "groups", group_id)],
            )
            .await?;
        }

        let word = repository::insert::<Word>(&mut tx, input).await?;
        if let Some(group_id) = group_id {
            link_word(&mut tx, group_id, &word.id).await?;
        }
        tx.commit().await?;

        tracing::debug!(word_id = %word.id, group_id = ?group_id, "word created");
        Ok(word)
    }

    /// 정답이면 `correct_count`, 오답이면 `wrong_count`를 1 올리고 갱신된 단어를 돌려줍니다.
    pub async fn record_review(&self, word_id: &str, correct: bool) -> Result<Word, AppError> {
        let mut tx = begin_write(self.pool()).await?;

        if !bump_counter(&mut tx, word_id, correct).await? {
            return Err(AppError::not_found(Word::RESOURCE, word_id));
        }
        let word = repository::ensure_exists::<Word>(&mut tx, word_id).await?;
        tx.commit().await?;

        tracing::debug!(word_id, correct, "review counter recorded");
        Ok(word)
    }
}

/// 카운터 증가는 `x = x + 1` 한 문장이라 읽기-수정-쓰기 경합이 없습니다.
/// 단어가 없으면 `false`.
pub(crate) async fn bump_counter(
    conn: &mut SqliteConnection,
    word_id: &str,
    correct: bool,
) -> Result<bool, AppError> {
    let sql = if correct {
        "UPDATE words SET correct_count = correct_count + 1 WHERE id = ?"
    } else {
        "UPDATE words SET wrong_count = wrong_count + 1 WHERE id = ?"
    };

    let result = sqlx::query(sql).bind(word_id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

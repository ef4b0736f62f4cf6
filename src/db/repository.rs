//! # 범용 저장소(Generic Repository)
//!
//! 어떤 엔티티 타입에도 같은 계약으로 동작하는 get / get_multi / create / update / remove를
//! 제공합니다. 엔티티별 차이(테이블 이름, 컬럼, 외래키, 정렬 키)는 `Entity` 트레이트가
//! 기술하고, SQL 조립과 트랜잭션 처리는 이 모듈이 한 곳에서 담당합니다.
//!
//! ## 연결 사용 규칙
//! 공개 메서드는 풀에서 연결(또는 트랜잭션)을 하나 빌려 연산 하나를 끝내고 반환합니다.
//! `pub(crate)` 함수들은 `&mut SqliteConnection`을 받으므로, 도메인 저장소가
//! 여러 단계를 한 트랜잭션으로 묶을 때 재사용합니다.

use crate::db::pagination::{PageRequest, SortKey};
use crate::db::store::{begin_write, Store};
use crate::error::AppError;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::marker::PhantomData;

/// INSERT/UPDATE에 바인딩할 값
///
/// 동적으로 조립하는 쿼리에서 컬럼마다 다른 타입을 한 목록에 담기 위한 열거형입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    /// `None`이면 SQL NULL
    NullableText(Option<String>),
    Integer(i64),
    Bool(bool),
}

impl SqlValue {
    fn push_to<'args>(self, qb: &mut QueryBuilder<'args, Sqlite>) {
        match self {
            SqlValue::Text(v) => {
                qb.push_bind(v);
            }
            SqlValue::NullableText(v) => {
                qb.push_bind(v);
            }
            SqlValue::Integer(v) => {
                qb.push_bind(v);
            }
            SqlValue::Bool(v) => {
                qb.push_bind(v);
            }
        }
    }
}

/// 외래키 필드 하나: 어떤 필드가 어느 테이블의 어떤 id를 가리키는지
#[derive(Debug, Clone)]
pub struct Reference {
    pub field: &'static str,
    pub table: &'static str,
    pub id: String,
}

impl Reference {
    pub fn new(field: &'static str, table: &'static str, id: impl Into<String>) -> Self {
        Self {
            field,
            table,
            id: id.into(),
        }
    }
}

/// 범용 저장소가 다룰 수 있는 엔티티
///
/// `SELECT`는 `FROM <table> t` 형태로 기준 테이블 별칭을 `t`로 두어야 합니다.
/// 정렬 키 컬럼과 범위 조건(scope)이 이 별칭을 기준으로 작성됩니다.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    /// 에러 메시지와 로그에 쓰는 이름 (예: "word")
    const RESOURCE: &'static str;
    const TABLE: &'static str;
    const SELECT: &'static str;

    type SortKey: SortKey;
    type Create: Sync;
    type Update: Sync;

    fn id(&self) -> &str;

    /// 새 행의 (컬럼, 값) 목록. `id`와 DB 기본값 컬럼은 제외합니다.
    fn insert_values(input: &Self::Create) -> Vec<(&'static str, SqlValue)>;

    /// 요청에 포함된 필드만 (컬럼, 값)으로 돌려줍니다. 빠진 필드는 건드리지 않습니다.
    fn update_values(patch: &Self::Update) -> Vec<(&'static str, SqlValue)>;

    /// 저장소에 닿기 전에 수정 요청을 검사합니다. 값이 필수인 필드에 `null`이 오면 거부합니다.
    fn validate_update(_patch: &Self::Update) -> Result<(), AppError> {
        Ok(())
    }

    fn create_references(_input: &Self::Create) -> Vec<Reference> {
        Vec::new()
    }

    fn update_references(_patch: &Self::Update) -> Vec<Reference> {
        Vec::new()
    }
}

/// 목록 조회를 관계로 좁히는 SQL 조각과 바인딩 값
///
/// `clause`는 FROM 절 뒤에 붙고 마지막 바인딩 자리(`?`)는 `value`로 채워집니다.
/// 예: `"JOIN word_groups wg ON wg.word_id = t.id WHERE wg.group_id = "`
pub(crate) struct Scope<'s> {
    pub clause: &'static str,
    pub value: &'s str,
}

/// 엔티티 타입 E에 대한 범용 저장소
pub struct Repository<'a, E> {
    pool: &'a SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> Repository<'a, E> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            pool: store.pool(),
            _entity: PhantomData,
        }
    }

    pub(crate) fn pool(&self) -> &'a SqlitePool {
        self.pool
    }

    /// 기본키로 조회합니다. 행이 없으면 에러가 아니라 `Ok(None)`입니다.
    pub async fn get(&self, id: &str) -> Result<Option<E>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id::<E>(&mut conn, id).await
    }

    /// 정렬된 전체 결과에서 `skip`개를 건너뛰고 최대 `limit`개를 돌려줍니다.
    pub async fn get_multi(&self, page: &PageRequest<E::SortKey>) -> Result<Vec<E>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_page::<E>(&mut conn, None, page).await
    }

    /// 새 행을 만들고, id와 기본값이 채워진 엔티티를 돌려줍니다.
    ///
    /// 외래키가 존재하지 않는 행을 가리키면 `ReferentialIntegrity`로 실패하고
    /// 아무것도 삽입되지 않습니다.
    pub async fn create(&self, input: &E::Create) -> Result<E, AppError> {
        let mut tx = begin_write(self.pool).await?;
        let entity = insert::<E>(&mut tx, input).await?;
        tx.commit().await?;

        tracing::debug!(resource = E::RESOURCE, id = entity.id(), "created");
        Ok(entity)
    }

    /// 부분 업데이트(PATCH). 행이 없으면 `Ok(None)`.
    pub async fn update(&self, id: &str, patch: &E::Update) -> Result<Option<E>, AppError> {
        E::validate_update(patch)?;

        let mut tx = begin_write(self.pool).await?;
        let updated = apply_update::<E>(&mut tx, id, patch).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// 행을 삭제하고 삭제 직전의 상태를 돌려줍니다. 행이 없으면 `Ok(None)`.
    ///
    /// `ON DELETE CASCADE`로 걸린 하위 행들도 같은 트랜잭션 안에서 함께 지워집니다.
    pub async fn remove(&self, id: &str) -> Result<Option<E>, AppError> {
        let mut tx = begin_write(self.pool).await?;

        let Some(entity) = fetch_by_id::<E>(&mut tx, id).await? else {
            return Ok(None);
        };

        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::debug!(resource = E::RESOURCE, id, "removed");
        Ok(Some(entity))
    }
}

/// 비울 수 없는 필드에 명시적 `null`이 왔으면 `Validation`
pub(crate) fn reject_null<T>(field: &str, value: &Option<Option<T>>) -> Result<(), AppError> {
    match value {
        Some(None) => Err(AppError::Validation(format!("{field} must not be null"))),
        _ => Ok(()),
    }
}

pub(crate) async fn fetch_by_id<E: Entity>(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<E>, AppError> {
    let sql = format!("{} WHERE t.id = ?", E::SELECT);
    let entity = sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(entity)
}

/// 도메인 연산용: 행이 없으면 `NotFound`로 바꿔 돌려줍니다.
pub(crate) async fn ensure_exists<E: Entity>(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<E, AppError> {
    fetch_by_id::<E>(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found(E::RESOURCE, id))
}

/// 한 문장(statement)으로 페이지를 읽으므로 페이지 안에서 찢어진 읽기가 없습니다.
pub(crate) async fn fetch_page<E: Entity>(
    conn: &mut SqliteConnection,
    scope: Option<Scope<'_>>,
    page: &PageRequest<E::SortKey>,
) -> Result<Vec<E>, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new(E::SELECT);

    if let Some(scope) = scope {
        qb.push(" ");
        qb.push(scope.clause);
        qb.push_bind(scope.value.to_string());
    }

    qb.push(" ORDER BY ");
    qb.push(page.order_by_sql());
    qb.push(" LIMIT ");
    qb.push_bind(page.limit());
    qb.push(" OFFSET ");
    qb.push_bind(page.skip());

    let rows = qb.build_query_as::<E>().fetch_all(&mut *conn).await?;
    Ok(rows)
}

/// 외래키가 가리키는 행이 모두 있는지 확인합니다.
pub(crate) async fn verify_references(
    conn: &mut SqliteConnection,
    references: Vec<Reference>,
) -> Result<(), AppError> {
    for reference in references {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", reference.table);
        let exists: Option<i64> = sqlx::query_scalar(&sql)
            .bind(&reference.id)
            .fetch_optional(&mut *conn)
            .await?;

        if exists.is_none() {
            return Err(AppError::ReferentialIntegrity {
                field: reference.field,
                id: reference.id,
            });
        }
    }
    Ok(())
}

pub(crate) async fn insert<E: Entity>(
    conn: &mut SqliteConnection,
    input: &E::Create,
) -> Result<E, AppError> {
    verify_references(conn, E::create_references(input)).await?;

    // UUIDv7: 시간 기반이라 기본키 오름차순이 곧 생성 순서입니다.
    let id = uuid::Uuid::now_v7().to_string();
    let values = E::insert_values(input);

    let mut qb = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {} (id", E::TABLE));
    for (column, _) in &values {
        qb.push(", ");
        qb.push(*column);
    }
    qb.push(") VALUES (");
    qb.push_bind(id.clone());
    for (_, value) in values {
        qb.push(", ");
        value.push_to(&mut qb);
    }
    qb.push(")");

    qb.build()
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_write(e, E::RESOURCE))?;

    fetch_by_id::<E>(conn, &id).await?.ok_or_else(|| {
        AppError::Internal(format!("failed to retrieve created {}", E::RESOURCE))
    })
}

pub(crate) async fn apply_update<E: Entity>(
    conn: &mut SqliteConnection,
    id: &str,
    patch: &E::Update,
) -> Result<Option<E>, AppError> {
    if fetch_by_id::<E>(conn, id).await?.is_none() {
        return Ok(None);
    }

    verify_references(conn, E::update_references(patch)).await?;

    let values = E::update_values(patch);
    if !values.is_empty() {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", E::TABLE));
        for (i, (column, value)) in values.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column);
            qb.push(" = ");
            value.push_to(&mut qb);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.to_string());

        qb.build()
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::from_write(e, E::RESOURCE))?;

        tracing::debug!(resource = E::RESOURCE, id, "updated");
    }

    fetch_by_id::<E>(conn, id).await
}

//! # 페이지네이션과 정렬
//!
//! 목록 조회(`get_multi`)의 공통 계약을 정의합니다.
//!
//! - `skip >= 0`, `limit >= 1`. 범위를 벗어나면 DB에 닿기 전에 `Validation` 에러
//! - 1부터 시작하는 페이지 번호 `p`와 크기 `s`는 `skip = (p-1)*s`로 바뀝니다.
//! - 정렬 키는 엔티티마다 열거형으로 정의하고, 허용 목록 밖의 이름은 거부합니다.
//!   알 수 없는 키를 조용히 기본 정렬로 바꾸지 않습니다.

use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 정렬 방향 (`asc` | `desc`, 기본값 `asc`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::Validation(format!(
                "unknown sort order '{other}' (expected 'asc' or 'desc')"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// 엔티티별 정렬 키 열거형이 구현하는 트레이트
///
/// 문자열 → 키 변환은 `FromStr`이 맡고(허용 목록 밖이면 `Validation`),
/// 키 → SQL 컬럼 변환은 `column()`이 맡습니다.
/// 조회 SQL에서 기준 테이블의 별칭은 항상 `t`입니다.
pub trait SortKey: Copy + FromStr<Err = AppError> + Send + Sync + 'static {
    fn column(self) -> &'static str;
}

/// 허용 목록 밖의 정렬 키 에러를 만듭니다.
pub(crate) fn unknown_sort_key(raw: &str, allowed: &[&str]) -> AppError {
    AppError::Validation(format!(
        "unknown sort key '{raw}' (allowed: {})",
        allowed.join(", ")
    ))
}

/// `limit`을 주지 않았을 때의 기본 페이지 크기
pub const DEFAULT_LIMIT: i64 = 100;

/// 목록 조회 요청: 건너뛸 행 수, 최대 행 수, 정렬 키와 방향
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<K> {
    skip: i64,
    limit: i64,
    sort: Option<K>,
    order: SortOrder,
}

impl<K: SortKey> Default for PageRequest<K> {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            sort: None,
            order: SortOrder::Asc,
        }
    }
}

impl<K: SortKey> PageRequest<K> {
    pub fn new(skip: i64, limit: i64) -> Result<Self, AppError> {
        if skip < 0 {
            return Err(AppError::Validation(format!(
                "skip must be >= 0 (got {skip})"
            )));
        }
        if limit < 1 {
            return Err(AppError::Validation(format!(
                "limit must be >= 1 (got {limit})"
            )));
        }
        Ok(Self {
            skip,
            limit,
            ..Self::default()
        })
    }

    /// 1부터 시작하는 페이지 번호로 요청을 만듭니다: `skip = (page - 1) * page_size`
    pub fn page(page: i64, page_size: i64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::Validation(format!(
                "page must be >= 1 (got {page})"
            )));
        }
        let skip = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| AppError::Validation("page is out of range".to_string()))?;
        Self::new(skip, page_size)
    }

    pub fn sorted_by(mut self, key: K, order: SortOrder) -> Self {
        self.sort = Some(key);
        self.order = order;
        self
    }

    /// 정렬 키 없이 방향만 바꿉니다 (기본키 기준 정렬의 방향).
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// 쿼리 문자열에서 받은 정렬 키/방향을 파싱해 적용합니다.
    pub fn parse_sort(
        mut self,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<Self, AppError> {
        if let Some(raw) = sort_by {
            self.sort = Some(raw.parse()?);
        }
        if let Some(raw) = order {
            self.order = raw.parse()?;
        }
        Ok(self)
    }

    pub fn skip(&self) -> i64 {
        self.skip
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn sort(&self) -> Option<K> {
        self.sort
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// `ORDER BY` 절 내용. 정렬 키가 같으면 기본키로 순서를 고정합니다.
    pub(crate) fn order_by_sql(&self) -> String {
        let dir = self.order.as_sql();
        match self.sort {
            Some(key) if key.column() != "t.id" => format!("{} {dir}, t.id {dir}", key.column()),
            _ => format!("t.id {dir}"),
        }
    }
}

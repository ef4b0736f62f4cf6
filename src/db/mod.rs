//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 라우트 핸들러(routes/)는 이 모듈의 저장소(Repository)를 통해서만 DB에 접근합니다.
//!
//! 각 하위 모듈:
//! - `store`: 연결 풀 핸들(`Store`)과 마이그레이션
//! - `pagination`: 목록 조회의 페이지/정렬 계약
//! - `repository`: 엔티티 타입에 대한 범용 CRUD(`Repository<E>`)
//! - `words` / `groups` / `study`: 도메인 저장소 (고유 필드 조회, 관계 조회, 연결/해제, 카운터)
//! - `dashboard`: 읽기 전용 통계 집계

pub mod dashboard;
pub mod groups;
pub mod pagination;
pub mod repository;
pub mod store;
pub mod study;
pub mod words;

// `crate::db::WordRepo`처럼 바로 접근할 수 있게 재공개합니다.
pub use dashboard::Dashboard;
pub use groups::{GroupRepo, GroupSortKey};
pub use pagination::{PageRequest, SortKey, SortOrder, DEFAULT_LIMIT};
pub use repository::{Entity, Repository};
pub use store::Store;
pub use study::{
    StudyActivityRepo, StudyActivitySortKey, StudySessionRepo, StudySessionSortKey,
    WordReviewRepo, WordReviewSortKey,
};
pub use words::{WordRepo, WordSortKey};

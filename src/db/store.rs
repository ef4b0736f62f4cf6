//! # 엔티티 저장소(Entity Store) 핸들
//!
//! SQLite 연결 풀을 감싸는 `Store`를 정의합니다.
//! 전역 엔진/세션 없이, 호스팅 애플리케이션(main)이 `Store::init()`으로 만들고
//! `Store::close()`로 닫습니다. 저장소(Repository)들은 생성 시 `&Store`를 받아
//! 연산마다 연결 하나(또는 트랜잭션 하나)를 빌려 쓰고 바로 돌려줍니다.

use crate::config::Config;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// `./migrations`의 SQL 파일을 컴파일 타임에 바이너리에 포함시킵니다.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// 데이터베이스 핸들
///
/// 내부의 `SqlitePool`은 Arc 기반이라 clone해도 같은 풀을 가리킵니다.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// 연결 풀을 열고 아직 적용되지 않은 마이그레이션을 실행합니다.
    ///
    /// - 외래키 검사(`PRAGMA foreign_keys`)는 연결마다 켜집니다. SQLite 기본값은 꺼짐입니다.
    /// - WAL 저널 모드: 읽기와 쓰기가 서로를 막지 않습니다.
    /// - busy timeout: 쓰기 잠금 경합 시 즉시 실패하지 않고 잠시 기다립니다.
    pub async fn init(config: &Config) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Running database migrations...");
        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    /// 풀의 모든 연결을 닫습니다. 진행 중인 연결이 반환될 때까지 기다립니다.
    pub async fn close(self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// 쓰기 트랜잭션을 `BEGIN IMMEDIATE`로 엽니다.
///
/// 시작하자마자 쓰기 잠금을 잡으므로, 다른 쓰기가 진행 중이면 busy timeout 동안
/// 기다린 뒤 순서대로 실행됩니다. 기본 `BEGIN`(DEFERRED)은 읽은 뒤 쓰기로 올라갈 때
/// WAL 스냅샷이 낡았으면 기다리지 않고 바로 `SQLITE_BUSY`로 실패합니다.
pub(crate) async fn begin_write(
    pool: &SqlitePool,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// 테스트마다 임시 디렉토리에 새 SQLite 파일을 만들어 저장소를 엽니다.
///
/// 반환된 `TempDir`이 drop되면 파일이 지워지므로, 테스트 동안 변수로 붙잡아 두어야 합니다.
#[cfg(test)]
pub(crate) async fn test_store() -> (Store, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("sona-test.db").display());
    let store = Store::init(&Config::with_database_url(url))
        .await
        .expect("failed to open test store");
    (store, dir)
}

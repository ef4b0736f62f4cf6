//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `DB_MAX_CONNECTIONS`: 연결 풀 최대 연결 수
//! - `PAGE_SIZE`: 목록 API의 기본 페이지 크기
//! - `ALLOWED_ORIGINS`: CORS 허용 출처 (쉼표 구분, 비어 있으면 모두 허용)
//! - `FRONTEND_DIST`: 빌드된 프론트엔드 디렉토리 (선택)
//! - `SEED_DATABASE`: 빈 DB에 예제 데이터를 넣을지 여부

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 저장소 초기화(`Store::init`)와 라우터 구성에 전달됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/sona.db?mode=rwc")
    pub database_url: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 연결 풀의 최대 연결 수 (기본값: 5)
    pub max_connections: u32,
    /// `page`만 주어지고 `limit`이 없을 때 쓰는 페이지 크기 (기본값: 100)
    pub page_size: i64,
    /// CORS 허용 출처 목록. 비어 있으면 모든 출처를 허용합니다.
    pub allowed_origins: Vec<String>,
    /// SPA 정적 파일 디렉토리
    pub frontend_dist: Option<String>,
    /// 빈 데이터베이스에 예제 단어/그룹을 채울지 여부
    pub seed_database: bool,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000),
            max_connections: parse_or("DB_MAX_CONNECTIONS", 5),
            page_size: parse_or("PAGE_SIZE", 100).max(1),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or_default(),
            frontend_dist: env::var("FRONTEND_DIST").ok().filter(|p| !p.is_empty()),
            seed_database: env::var("SEED_DATABASE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// 테스트나 임베딩 용도로 DB URL만 지정한 기본 설정을 만듭니다.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_connections: 5,
            page_size: 100,
            allowed_origins: Vec::new(),
            frontend_dist: None,
            seed_database: false,
        }
    }
}

/// 환경변수를 파싱하고, 없거나 형식이 틀리면 기본값을 씁니다.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = split_origins(" http://localhost:5173, ,http://127.0.0.1:8080 ");
        assert_eq!(
            origins,
            vec!["http://localhost:5173", "http://127.0.0.1:8080"]
        );
    }

    #[test]
    fn explicit_database_url_uses_defaults() {
        let config = Config::with_database_url("sqlite::memory:");
        assert_eq!(config.page_size, 100);
        assert!(config.allowed_origins.is_empty());
        assert!(!config.seed_database);
    }
}

//! # sona 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 저장소(Store) 열기 + 마이그레이션
//! 4. (선택) 예제 데이터 채우기
//! 5. API 라우터와 미들웨어(CORS, 요청 로깅, 정적 파일) 설정
//! 6. HTTP 서버 시작, 종료 시 저장소 닫기

use anyhow::Result;
use axum::{http::HeaderValue, Router};
use sona::{
    config::Config,
    db::Store,
    routes::{api_router, AppState},
    seed,
};
use std::path::Path;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 sona, tower_http, axum 모듈을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sona=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting sona server on {}:{}", config.host, config.port);

    // ── 4단계: 저장소 열기 ──
    // 연결 풀 생성과 마이그레이션 실행을 `Store::init`이 함께 처리합니다.
    let store = Store::init(&config).await?;

    if config.seed_database && seed::seed_if_empty(&store).await? {
        tracing::info!("Seeded empty database with example vocabulary");
    }

    // ── 5단계: 애플리케이션 상태(State)와 라우터 ──
    let state = AppState {
        store: store.clone(),
        page_size: config.page_size,
    };
    let api_routes = api_router(state);

    // ── 6단계: CORS 미들웨어 설정 ──
    // ALLOWED_ORIGINS가 비어 있으면 모든 출처를 허용합니다 (개발용).
    let origins = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let list = config
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(list)
    };
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 7단계: 프론트엔드 정적 파일 서빙 설정 ──
    // SPA이므로 찾을 수 없는 경로는 index.html로 돌려보냅니다.
    let frontend_dist = config
        .frontend_dist
        .as_deref()
        .filter(|dir| Path::new(dir).exists());

    let app = if let Some(dist) = frontend_dist {
        tracing::info!("Serving frontend static files from {}", dist);

        let index = ServeFile::new(Path::new(dist).join("index.html"));
        let serve_dir = ServeDir::new(dist).not_found_service(index);

        Router::new()
            .nest("/api/v1", api_routes)
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Frontend dist directory not configured or missing, serving API only");

        Router::new()
            .nest("/api/v1", api_routes)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Ctrl+C를 받으면 진행 중인 요청을 마무리하고 멈춥니다.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Store closed, bye");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // 신호를 못 받으면 종료하지 않고 계속 서빙합니다.
        std::future::pending::<()>().await;
    }
}

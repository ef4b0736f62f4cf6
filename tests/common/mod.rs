use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sona::config::Config;
use sona::db::Store;
use sona::routes::{api_router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

/// 임시 SQLite 파일 위의 API 라우터. `_dir`이 살아 있는 동안만 파일이 유지됩니다.
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    _dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("api-test.db").display());
    let store = Store::init(&Config::with_database_url(url)).await.unwrap();

    let state = AppState {
        store: store.clone(),
        page_size: 100,
    };
    let router = Router::new().nest("/api/v1", api_router(state));

    TestApp {
        router,
        store,
        _dir: dir,
    }
}

impl TestApp {
    /// 요청 한 건을 보내고 (상태 코드, JSON 본문)을 돌려줍니다.
    /// 본문이 JSON이 아니면 `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::get;
use axum::Router;
use reqwest::Client;
use serde_json::Value;

use formrelay::config::{
    Config, EmailJsConfig, FirebaseConfig, FormsConfig, GoogleSheetsConfig,
};
use formrelay::relay::FormRelay;

/// A request captured by a [`MockProvider`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    status: AtomicU16,
    delay_ms: AtomicU64,
}

/// Stand-in for a provider endpoint: records every request and answers with
/// a configurable status, optionally after a delay.
#[derive(Clone)]
pub struct MockProvider {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockProvider {
    pub async fn start(status: u16) -> Self {
        let state = Arc::new(MockState::default());
        state.status.store(status, Ordering::SeqCst);

        let app = Router::new().fallback(record).with_state(state.clone());
        let addr = serve(app).await;

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last_body(&self) -> Value {
        self.requests()
            .last()
            .map(|r| r.body.clone())
            .expect("mock provider received no requests")
    }
}

async fn record(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(|q| q.to_string()),
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body,
    });

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap()
}

/// Serve the site's shared header; the footer is left to 404.
pub async fn spawn_fragment_server() -> SocketAddr {
    let app = Router::new().route(
        "/components/header.html",
        get(|| async { "<header>EcoGuard</header>" }),
    );
    serve(app).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock server failed");
    });

    addr
}

/// A URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/exec")
}

pub fn sheets_config(endpoint: &str) -> FormsConfig {
    FormsConfig {
        provider: Some("google-sheets".to_string()),
        google_sheets: GoogleSheetsConfig {
            endpoint: endpoint.to_string(),
        },
        ..FormsConfig::default()
    }
}

pub fn firebase_config(base_url: &str) -> FormsConfig {
    FormsConfig {
        provider: Some("firebase".to_string()),
        firebase: FirebaseConfig {
            api_key: "test-key".to_string(),
            project_id: "eco-site".to_string(),
            collection: "formSubmissions".to_string(),
            base_url: Some(base_url.to_string()),
        },
        ..FormsConfig::default()
    }
}

pub fn emailjs_config(endpoint: &str, to_email: Option<&str>) -> FormsConfig {
    FormsConfig {
        provider: Some("emailjs".to_string()),
        emailjs: EmailJsConfig {
            service_id: "service_eco".to_string(),
            template_id: "template_contact".to_string(),
            public_key: "pk_live_123".to_string(),
            to_email: to_email.map(|t| t.to_string()),
            endpoint: Some(endpoint.to_string()),
        },
        ..FormsConfig::default()
    }
}

pub fn relay(forms: FormsConfig) -> FormRelay {
    relay_with_timeout(forms, Duration::from_secs(5))
}

pub fn relay_with_timeout(forms: FormsConfig, timeout: Duration) -> FormRelay {
    FormRelay::new(forms, Some(timeout)).expect("Failed to build relay")
}

pub fn test_config(forms: FormsConfig) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 65_536,
        trusted_proxies: vec![],
        cors_origins: vec![],
        honeypot_field: None,
        rate_limit: 100,
        client_rate_limit: 1_000,
        rate_limit_window_secs: 60,
        request_timeout: Some(Duration::from_secs(5)),
        log_level: "warn".to_string(),
        forms,
    }
}

/// A running relay server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit form-urlencoded data as if posted from `referer`.
    pub async fn submit_form(
        &self,
        path: &str,
        referer: &str,
        data: &[(&str, &str)],
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .header("referer", referer)
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        (body, status)
    }

    pub async fn submit_json(&self, path: &str, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        (body, status)
    }
}

pub async fn spawn_app(config: Config) -> TestApp {
    let (app, _state) = formrelay::build_app(config).expect("Failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

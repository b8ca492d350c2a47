//! In-process stand-in for oauth.telegram.org.
//!
//! Each path gets a scripted reply; every request is recorded so tests can
//! assert on headers, cookies, bodies and which steps were reached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use telegram_auth::AuthConfig;

pub const BOT_ID: i64 = 12345678;
pub const DOMAIN: &str = "example.com";
pub const PHONE: &str = "79000000000";

/// Scripted response for one path.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: String,
    set_cookies: Vec<String>,
    location: Option<String>,
    delay: Option<Duration>,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            set_cookies: Vec::new(),
            location: None,
            delay: None,
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FOUND,
            location: Some(location.into()),
            ..Self::ok("")
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_cookie(mut self, set_cookie: impl Into<String>) -> Self {
        self.set_cookies.push(set_cookie.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockTelegram {
    pub base_url: String,
    state: MockState,
}

impl MockTelegram {
    pub async fn start() -> Self {
        init_tracing();

        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/", addr),
            state,
        }
    }

    /// Answer every request to `path` with `reply`.
    pub fn reply(&self, path: &str, reply: Reply) -> &Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn config(&self) -> AuthConfig {
        AuthConfig::new(BOT_ID, DOMAIN).with_oauth_url(self.base_url.clone())
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
        body,
    });

    let reply = state.replies.lock().unwrap().get(uri.path()).cloned();
    let Some(reply) = reply else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = Response::builder().status(reply.status);
    for cookie in &reply.set_cookies {
        response = response.header(header::SET_COOKIE, cookie);
    }
    if let Some(location) = &reply.location {
        response = response.header(header::LOCATION, location);
    }
    response.body(Body::from(reply.body)).unwrap()
}

/// Respect RUST_LOG when running tests with `--nocapture`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Profile page body as the widget serves it.
pub fn profile_page(id: i64, first_name: &str) -> String {
    format!(
        r#"<html><script>TWidgetLogin.init('widget_login', {}, {{"id":{},"first_name":"{}","last_name":"Petrov","username":"ivan","photo_url":"https:\/\/t.me\/i\/userpic\/320\/ivan.jpg","auth_date":1634567890,"hash":"f00dfeed"}}, false, "en");</script></html>"#,
        BOT_ID, id, first_name
    )
}

//! Common test utilities: a console wired to a mock admin API.
#![allow(dead_code)]

use admin_console::navigation::HistoryNavigator;
use admin_console::Console;
use api_core::{ApiClient, ApiSettings, MemorySessionStore, UserProfile};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{Match, MockServer, Request};

/// Address nothing listens on.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1/api/";

pub struct TestConsole {
    pub server: MockServer,
    pub console: Console,
    pub session: Arc<MemorySessionStore>,
    pub navigator: Arc<HistoryNavigator>,
}

impl TestConsole {
    /// Number of requests the mock API has received so far.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

/// Console talking to a fresh mock server, with the given session.
pub async fn spawn_console(session: MemorySessionStore) -> TestConsole {
    let server = MockServer::start().await;
    let session = Arc::new(session);
    let navigator = Arc::new(HistoryNavigator::new());
    let api = ApiClient::new(
        &ApiSettings::new(format!("{}/api/", server.uri())),
        session.clone(),
    )
    .expect("Failed to build API client");

    TestConsole {
        server,
        console: Console::new(api, navigator.clone()),
        session,
        navigator,
    }
}

/// Console whose API cannot be reached at all.
pub fn offline_console(
    session: MemorySessionStore,
) -> (Console, Arc<MemorySessionStore>, Arc<HistoryNavigator>) {
    let session = Arc::new(session);
    let navigator = Arc::new(HistoryNavigator::new());
    let api = ApiClient::new(&ApiSettings::new(UNREACHABLE_BASE_URL), session.clone())
        .expect("Failed to build API client");
    (Console::new(api, navigator.clone()), session, navigator)
}

pub fn profile(id: u64, name: &str) -> UserProfile {
    UserProfile {
        id,
        display_name: name.to_string(),
        role: None,
        avatar_path: None,
    }
}

pub fn ok(payload: Value) -> Value {
    let mut body = json!({"status": true});
    if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), payload) {
        target.extend(extra);
    }
    body
}

/// Matches requests carrying no `Authorization` header.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

/// Multipart field names in the order they appear in the request body.
pub fn multipart_field_names(request: &Request) -> Vec<String> {
    let body = String::from_utf8_lossy(&request.body);
    body.split("Content-Disposition: form-data; name=\"")
        .skip(1)
        .filter_map(|part| part.split('"').next())
        .map(str::to_string)
        .collect()
}

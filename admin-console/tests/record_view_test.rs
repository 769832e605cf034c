mod common;

use admin_console::models::Category;
use admin_console::services::CategoryClient;
use admin_console::views::{RecordView, ViewScope};
use api_core::{ApiError, MemorySessionStore};
use common::{ok, spawn_console};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_category(app: &common::TestConsole, id: u64, name: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/api/categories/{}", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok(json!({
                    "category": {"id": id, "name": name, "is_active": 1}
                })))
                .set_delay(delay),
        )
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn newer_load_wins_over_slower_older_one() {
    let app = spawn_console(MemorySessionStore::with_session("T1", None)).await;
    mount_category(&app, 1, "Chairs", Duration::from_millis(500)).await;
    mount_category(&app, 2, "Tables", Duration::ZERO).await;

    let scope = ViewScope::new();
    let view: RecordView<u64, Category> = RecordView::new(&scope, app.console.api());

    let (first, second) = tokio::join!(
        view.load(1, |api| async move { CategoryClient::new(api).get(1).await }),
        view.load(2, |api| async move { CategoryClient::new(api).get(2).await }),
    );

    assert!(matches!(first, Err(ApiError::Cancelled)));
    assert_eq!(second.unwrap().name, "Tables");
    assert_eq!(view.current().map(|c| c.id), Some(2));
    assert_eq!(view.key(), Some(2));
}

#[tokio::test]
async fn closing_the_scope_aborts_in_flight_requests() {
    let app = spawn_console(MemorySessionStore::with_session("T1", None)).await;
    mount_category(&app, 3, "Lighting", Duration::from_secs(5)).await;

    let scope = ViewScope::new();
    let client = CategoryClient::new(scope.client(app.console.api()));
    let request = tokio::spawn(async move { client.get(3).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(scope);

    let result = tokio::time::timeout(Duration::from_secs(2), request)
        .await
        .expect("request was not aborted")
        .expect("task panicked");
    assert!(matches!(result, Err(ApiError::Cancelled)));
}

mod common;

use admin_console::models::ProjectStatus;
use admin_console::services::{CategoryForm, DesignForm, ProductForm, ProjectForm, TimelineForm};
use api_core::{ErrorKind, MemorySessionStore, Upload};
use chrono::NaiveDate;
use common::{multipart_field_names, ok, spawn_console, TestConsole};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, Request, ResponseTemplate};

async fn signed_in() -> TestConsole {
    spawn_console(MemorySessionStore::with_session("T1", None)).await
}

async fn last_request(app: &TestConsole) -> Request {
    app.server
        .received_requests()
        .await
        .and_then(|mut requests| requests.pop())
        .expect("no request received")
}

async fn respond_ok(app: &TestConsole, verb: &str, route: &str) {
    Mock::given(method(verb))
        .and(path(route))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Saved"
        })))
        .expect(1)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn lists_and_shows_categories() {
    let app = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "categories": [
                {"id": 1, "name": "Chairs", "slug": "chairs", "description": null, "image": null, "is_active": true},
                {"id": 2, "name": "Tables", "slug": "tables", "description": "Dining", "image": null, "is_active": 0}
            ]
        }))))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "category": {"id": 2, "name": "Tables", "is_active": 0}
        }))))
        .mount(&app.server)
        .await;

    let categories = app.console.categories().list().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert!(!categories[1].is_active);

    let category = app.console.categories().get(2).await.unwrap();
    assert_eq!(category.name, "Tables");
}

#[tokio::test]
async fn category_update_sends_full_field_set_with_override() {
    let app = signed_in().await;
    respond_ok(&app, "POST", "/api/categories/4").await;

    app.console
        .categories()
        .update(
            4,
            &CategoryForm {
                name: "Lighting".to_string(),
                description: None,
                is_active: true,
                image: Some(Upload::new("lamp.png", vec![1, 2, 3])),
            },
        )
        .await
        .unwrap();

    let request = last_request(&app).await;
    assert_eq!(
        multipart_field_names(&request),
        vec!["name", "description", "is_active", "image", "_method"]
    );
}

#[tokio::test]
async fn product_create_sends_array_images() {
    let app = signed_in().await;
    respond_ok(&app, "POST", "/api/products").await;

    app.console
        .products()
        .create(&ProductForm {
            category_id: 2,
            name: "Oak Dining Chair".to_string(),
            description: None,
            price: 8500.0,
            stock_quantity: 4,
            sku: "CH-OAK-01".to_string(),
            is_active: true,
            images: vec![Upload::new("a.jpg", vec![1]), Upload::new("b.jpg", vec![2])],
        })
        .await
        .unwrap();

    let request = last_request(&app).await;
    assert_eq!(
        multipart_field_names(&request),
        vec![
            "category_id",
            "name",
            "description",
            "price",
            "stock_quantity",
            "sku",
            "is_active",
            "images[]",
            "images[]"
        ]
    );
}

#[tokio::test]
async fn product_update_lists_images_to_delete() {
    let app = signed_in().await;
    respond_ok(&app, "POST", "/api/products/12").await;

    app.console
        .products()
        .update(
            12,
            &ProductForm {
                category_id: 2,
                name: "Oak Dining Chair".to_string(),
                description: Some("Solid oak".to_string()),
                price: 9000.0,
                stock_quantity: 3,
                sku: "CH-OAK-01".to_string(),
                is_active: false,
                images: vec![],
            },
            &["products/a.jpg".to_string(), "products/b.jpg".to_string()],
        )
        .await
        .unwrap();

    let request = last_request(&app).await;
    let fields = multipart_field_names(&request);
    assert_eq!(
        fields.iter().filter(|f| *f == "images_to_delete[]").count(),
        2
    );
    assert_eq!(fields.last().map(String::as_str), Some("_method"));
}

#[tokio::test]
async fn invalid_product_is_not_submitted() {
    let app = signed_in().await;

    let err = app
        .console
        .products()
        .create(&ProductForm {
            category_id: 2,
            name: String::new(),
            description: None,
            price: -5.0,
            stock_quantity: 1,
            sku: "X".to_string(),
            is_active: true,
            images: vec![],
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(app.request_count().await, 0);
}

#[tokio::test]
async fn orders_are_paginated() {
    let app = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "orders": {
                "current_page": 2,
                "last_page": 3,
                "total": 25,
                "data": [{
                    "id": 41,
                    "order_number": "ORD-2024-0041",
                    "total_amount": 17000,
                    "status": "pending",
                    "payment_status": "unpaid",
                    "payment_method": "mpesa",
                    "mpesa_transaction_id": null,
                    "shipping_address": {"address": "Ngong Rd", "city": "Nairobi", "country": "Kenya", "postal_code": "00100"},
                    "created_at": "2024-06-01T12:00:00.000000Z",
                    "items": []
                }]
            }
        }))))
        .expect(1)
        .mount(&app.server)
        .await;

    let page = app.console.orders().list(2).await.unwrap();
    assert!(page.has_next());
    assert!(page.has_previous());
    assert_eq!(page.data[0].order_number, "ORD-2024-0041");
    assert_eq!(
        page.data[0].shipping_address.as_ref().map(|a| a.city.as_str()),
        Some("Nairobi")
    );
}

#[tokio::test]
async fn project_create_is_json_and_update_is_multipart() {
    let app = signed_in().await;

    let form = ProjectForm {
        title: "Karen Villa".to_string(),
        description: None,
        location: Some("Karen".to_string()),
        start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        end_date: None,
        status: ProjectStatus::Pending,
    };

    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "title": "Karen Villa",
            "description": "",
            "location": "Karen",
            "start_date": "2024-02-01",
            "end_date": "",
            "status": "pending"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(ok(json!({
            "project": {"id": 5, "title": "Karen Villa", "status": "pending"}
        }))))
        .expect(1)
        .mount(&app.server)
        .await;

    let created = app.console.projects().create(&form).await.unwrap();
    assert_eq!(created.map(|p| p.id), Some(5));

    respond_ok(&app, "POST", "/api/projects/5").await;
    app.console.projects().update(5, &form).await.unwrap();

    let request = last_request(&app).await;
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    assert_eq!(
        multipart_field_names(&request),
        vec![
            "title",
            "description",
            "location",
            "start_date",
            "end_date",
            "status",
            "_method"
        ]
    );
}

#[tokio::test]
async fn timeline_update_keeps_remaining_images() {
    let app = signed_in().await;
    respond_ok(&app, "POST", "/api/projects/5/timelines/9").await;

    app.console
        .timelines()
        .update(
            5,
            9,
            &TimelineForm {
                title: "Kitchen install".to_string(),
                description: None,
                timeline_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                images: vec![Upload::new("k3.jpg", vec![3])],
            },
            &[30],
        )
        .await
        .unwrap();

    let request = last_request(&app).await;
    assert_eq!(
        multipart_field_names(&request),
        vec![
            "title",
            "description",
            "timeline_date",
            "remaining_images",
            "images[0]",
            "_method"
        ]
    );
    assert!(String::from_utf8_lossy(&request.body).contains("[30]"));
}

#[tokio::test]
async fn deletes_use_delete_verb() {
    let app = signed_in().await;
    respond_ok(&app, "DELETE", "/api/categories/1").await;
    respond_ok(&app, "DELETE", "/api/products/2").await;
    respond_ok(&app, "DELETE", "/api/projects/3").await;
    respond_ok(&app, "DELETE", "/api/designs/4").await;
    respond_ok(&app, "DELETE", "/api/projects/3/timelines/9").await;

    app.console.categories().delete(1).await.unwrap();
    app.console.products().delete(2).await.unwrap();
    app.console.projects().delete(3).await.unwrap();
    app.console.designs().delete(4).await.unwrap();
    let message = app.console.timelines().delete(3, 9).await.unwrap();

    assert_eq!(message.as_deref(), Some("Saved"));
}

#[tokio::test]
async fn design_image_delete_uses_json_override() {
    let app = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/design-images/77"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"_method": "DELETE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .expect(1)
        .mount(&app.server)
        .await;

    app.console.designs().delete_image(77).await.unwrap();
}

#[tokio::test]
async fn design_create_and_paginated_list() {
    let app = signed_in().await;
    respond_ok(&app, "POST", "/api/designs").await;

    Mock::given(method("GET"))
        .and(path("/api/designs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "designs": {
                "current_page": 1,
                "last_page": 1,
                "total": 1,
                "data": [{"id": 4, "title": "Scandi", "description": null, "images": [{"id": 77, "image_path": "designs/a.jpg"}]}]
            }
        }))))
        .mount(&app.server)
        .await;

    app.console
        .designs()
        .create(&DesignForm {
            title: "Scandi".to_string(),
            description: None,
            images: vec![Upload::new("a.jpg", vec![1])],
        })
        .await
        .unwrap();
    assert_eq!(
        multipart_field_names(&last_request(&app).await),
        vec!["title", "description", "images[]"]
    );

    let page = app.console.designs().list(1).await.unwrap();
    assert!(!page.has_next());
    assert_eq!(page.data[0].images[0].id, 77);
}

#[tokio::test]
async fn rejection_message_reaches_the_caller() {
    let app = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": false,
            "message": "The name has already been taken."
        })))
        .mount(&app.server)
        .await;

    let err = app
        .console
        .categories()
        .create(&CategoryForm {
            name: "Chairs".to_string(),
            description: None,
            is_active: true,
            image: None,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message("Failed to create category. Please try again."),
        "The name has already been taken."
    );
}

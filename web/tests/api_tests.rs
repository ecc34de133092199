//! HTTP contract tests for the todo API against the in-memory repository.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use todolist_core::memory::InMemoryTodoRepository;
use todolist_core::todo::Todo;

fn server_with(repository: InMemoryTodoRepository) -> TestServer {
    TestServer::new(todolist_web::app(repository)).expect("Failed to start test server")
}

fn server() -> (TestServer, InMemoryTodoRepository) {
    let repository = InMemoryTodoRepository::new();
    (server_with(repository.clone()), repository)
}

fn error_of(body: &Value) -> &str {
    body["error"].as_str().expect("error envelope")
}

#[tokio::test]
async fn test_create_returns_201_with_trimmed_pending_todo() {
    let (server, _) = server();

    let response = server.post("/api/todos").json(&json!({ "text": "  Buy milk " })).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let todo: Todo = response.json();
    assert_eq!(todo.text, "Buy milk");
    assert!(!todo.completed);

    let fetched: Todo = server.get(&format!("/api/todos/{}", todo.id)).await.json();
    assert_eq!(fetched, todo);
}

#[tokio::test]
async fn test_create_rejects_invalid_text_and_persists_nothing() {
    let (server, repository) = server();

    for body in [
        json!({}),
        json!({ "text": "" }),
        json!({ "text": "   " }),
        json!({ "text": 42 }),
        json!({ "text": null }),
    ] {
        let response = server.post("/api/todos").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            error_of(&response.json()),
            "Todo text is required and must be a non-empty string"
        );
    }

    let response = server
        .post("/api/todos")
        .json(&json!({ "text": "a".repeat(256) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_of(&response.json()),
        "Todo text must be at most 255 characters"
    );

    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_create_accepts_exactly_255_characters() {
    let (server, _) = server();

    let response = server
        .post("/api/todos")
        .json(&json!({ "text": "a".repeat(255) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_list_is_newest_first_and_matches_get() {
    let (server, _) = server();
    for text in ["First", "Second", "Third"] {
        server.post("/api/todos").json(&json!({ "text": text })).await;
    }

    let todos: Vec<Todo> = server.get("/api/todos").await.json();
    let texts: Vec<&str> = todos.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Third", "Second", "First"]);

    for todo in &todos {
        let fetched: Todo = server.get(&format!("/api/todos/{}", todo.id)).await.json();
        assert_eq!(&fetched, todo);
    }
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let (server, _) = server();

    for path in ["/api/todos/999", "/api/todos/abc"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>(), json!({ "error": "Todo not found" }));
    }
}

#[tokio::test]
async fn test_patch_toggles_completion_and_refreshes_updated_at() {
    let (server, _) = server();
    let created: Todo = server
        .post("/api/todos")
        .json(&json!({ "text": "Buy milk" }))
        .await
        .json();

    let response = server
        .patch(&format!("/api/todos/{}", created.id))
        .json(&json!({ "completed": true }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let patched: Todo = response.json();
    assert!(patched.completed);
    assert!(patched.updated_at > patched.created_at);

    let todos: Vec<Todo> = server.get("/api/todos").await.json();
    assert!(todos[0].completed);
}

#[tokio::test]
async fn test_patch_requires_completed() {
    let (server, _) = server();
    let created: Todo = server
        .post("/api/todos")
        .json(&json!({ "text": "Buy milk" }))
        .await
        .json();

    for body in [json!({}), json!({ "completed": null })] {
        let response = server
            .patch(&format!("/api/todos/{}", created.id))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&response.json()), "Completed status is required");
    }
}

#[tokio::test]
async fn test_patch_unknown_id_creates_nothing() {
    let (server, repository) = server();

    let response = server
        .patch("/api/todos/41")
        .json(&json!({ "completed": true }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_put_replaces_text_and_defaults_completed_to_false() {
    let (server, _) = server();
    let created: Todo = server
        .post("/api/todos")
        .json(&json!({ "text": "Buy milk" }))
        .await
        .json();
    let path = format!("/api/todos/{}", created.id);

    let done: Todo = server
        .put(&path)
        .json(&json!({ "text": " Buy oat milk ", "completed": true }))
        .await
        .json();
    assert_eq!(done.text, "Buy oat milk");
    assert!(done.completed);

    let reset: Todo = server.put(&path).json(&json!({ "text": "Buy oat milk" })).await.json();
    assert!(!reset.completed);
}

#[tokio::test]
async fn test_put_validates_before_looking_up_the_id() {
    let (server, _) = server();

    let response = server.put("/api/todos/77").json(&json!({ "text": "" })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.put("/api/todos/77").json(&json!({ "text": "ok" })).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_returns_204_then_404() {
    let (server, repository) = server();
    let created: Todo = server
        .post("/api/todos")
        .json(&json!({ "text": "Temporary" }))
        .await
        .json();
    let path = format!("/api/todos/{}", created.id);

    assert_eq!(server.delete(&path).await.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(server.delete(&path).await.status_code(), StatusCode::NOT_FOUND);
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_store_failure_maps_to_internal_error_envelope() {
    let (server, repository) = server();
    repository.set_unavailable(true);

    let response = server.get("/api/todos").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), json!({ "error": "Failed to fetch todos" }));

    let response = server.post("/api/todos").json(&json!({ "text": "x" })).await;
    assert_eq!(error_of(&response.json()), "Failed to create todo");

    let response = server
        .patch("/api/todos/1")
        .json(&json!({ "completed": true }))
        .await;
    assert_eq!(
        error_of(&response.json()),
        "Failed to update todo completion status"
    );
}

#[tokio::test]
async fn test_health_endpoints() {
    let (server, repository) = server();

    let live = server.get("/health").await;
    assert_eq!(live.status_code(), StatusCode::OK);
    assert_eq!(live.text(), "ok");

    let ready = server.get("/api/health").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    let body: Value = ready.json();
    assert_eq!(body["component"], "database");
    assert_eq!(body["status"], "Healthy");

    repository.set_unavailable(true);
    let ready = server.get("/api/health").await;
    assert_eq!(ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ready.json::<Value>()["status"], "Unhealthy");
}

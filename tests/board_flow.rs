//! End-to-end board flows: controller + HTTP client against a mock backend,
//! checked through the rendered board.

use chrono::Utc;
use kanban_client::render::{render_board, ColumnBody, EMPTY_PLACEHOLDER};
use kanban_client::{ClientConfig, Controller, HttpTaskApi, Status};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn row(id: i64, title: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": status,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": null
    })
}

async fn controller(server: &MockServer) -> Controller<HttpTaskApi> {
    let config = ClientConfig {
        base_url: format!("{}/api", server.uri()),
        ..Default::default()
    };
    let mut controller =
        Controller::new(HttpTaskApi::new(&config).unwrap(), Duration::from_secs(3));
    controller.load().await;
    controller
}

async fn seeded_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row(1, "plan", "todo"),
            row(2, "build", "in_progress"),
        ])))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn created_task_lands_in_todo_column() {
    let server = seeded_server().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(row(3, "ship", "todo")))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller(&server).await;
    let before = render_board(controller.tasks(), Utc::now());

    controller.add_form_mut().title = "ship".into();
    controller.submit_new_task().await;

    let after = render_board(controller.tasks(), Utc::now());
    assert_eq!(after.total(), before.total() + 1);
    assert_eq!(after.column(Status::Todo).count, 2);
    let titles: Vec<_> = after
        .column(Status::Todo)
        .body
        .cards()
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(titles, vec!["plan", "ship"]);
}

#[tokio::test]
async fn moved_card_migrates_columns() {
    let server = seeded_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .and(body_json(json!({"status": "done"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(row(1, "plan", "done")))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller(&server).await;
    controller.move_task(1, Status::Done).await;

    let view = render_board(controller.tasks(), Utc::now());
    assert_eq!(
        view.column(Status::Todo).body,
        ColumnBody::Empty(EMPTY_PLACEHOLDER)
    );
    assert_eq!(view.column(Status::Done).body.cards()[0].id, 1);
    assert_eq!(view.column(Status::InProgress).body.cards()[0].title, "build");
}

#[tokio::test]
async fn deleted_card_decrements_its_column() {
    let server = seeded_server().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller(&server).await;
    controller.request_delete(2);
    controller.confirm_delete().await;

    let view = render_board(controller.tasks(), Utc::now());
    assert_eq!(view.column(Status::InProgress).count, 0);
    assert_eq!(view.column(Status::Todo).count, 1);
}

#[tokio::test]
async fn rejected_update_keeps_board_and_reports() {
    let server = seeded_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller(&server).await;
    let before = controller.tasks().to_vec();

    controller.drag_start(2);
    controller.drop_on(Status::Done).await;

    assert_eq!(controller.tasks(), before.as_slice());
    let notice = controller.notification(Instant::now()).unwrap();
    assert_eq!(notice.message, "Failed to move task");
}

#[tokio::test]
async fn drop_on_own_column_sends_exactly_one_update() {
    let server = seeded_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .and(body_json(json!({"status": "todo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(row(1, "plan", "todo")))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller(&server).await;
    controller.drag_start(1);
    controller.drop_on(Status::Todo).await;

    let puts = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .count();
    assert_eq!(puts, 1);
    assert_eq!(controller.board().get(1).unwrap().status, Status::Todo);
}

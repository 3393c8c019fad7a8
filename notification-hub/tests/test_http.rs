mod common;
pub use common::*;

use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde_json::{json, Value};
use serial_test::parallel;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub"]
async fn send_notification_received_by_stream() {
    init_env();

    // stream attached before sending notification
    // should receive exactly that notification

    let client = Client::new();
    let user_id = unique_user_id();

    let mut stream = client
        .get(format!(
            "http://{}/notifications/stream?userId={user_id}",
            address()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(
        stream.headers().get(CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let created = send_notification(&client, &user_id, "Order shipped").await;
    let id = created.get("id").unwrap().as_str().unwrap();

    let chunk = timeout(Duration::from_secs(5), stream.chunk())
        .await
        .unwrap() // timeout
        .unwrap()
        .unwrap(); // chunk
    let event = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(event.contains("event: notification"));
    assert!(event.contains(&format!("id: {id}")));
    assert!(event.contains("Order shipped"));
}

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub"]
async fn send_notification_missing_fields_bad_request() {
    init_env();

    let client = Client::new();

    let response = client
        .post(format!("http://{}/notifications/send", address()))
        .header(CONTENT_TYPE, "application/json")
        .body(json!({ "userId": unique_user_id(), "title": "Order shipped" }).to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub"]
async fn list_newest_first_and_excludes_deleted() {
    init_env();

    // after sending 3 notifications and deleting the newest one
    // list should return remaining 2, newest first

    let client = Client::new();
    let user_id = unique_user_id();

    let first = send_notification(&client, &user_id, "first").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = send_notification(&client, &user_id, "second").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let third = send_notification(&client, &user_id, "third").await;

    let third_id = third.get("id").unwrap().as_str().unwrap();
    let response = client
        .delete(format!("http://{}/notifications/{third_id}", address()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!(
            "http://{}/notifications?userId={user_id}&page=1&limit=10",
            address()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page.get("total").unwrap(), 2);
    let ids = page
        .get("data")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|notification| notification.get("id").unwrap().clone())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            second.get("id").unwrap().clone(),
            first.get("id").unwrap().clone()
        ]
    );

    // deleted notification is still available by id
    let response = client
        .get(format!("http://{}/notifications/{third_id}", address()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let found = body_json(response).await;
    assert_eq!(found.get("deleted").unwrap(), true);
}

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub"]
async fn mark_read_twice_ok() {
    init_env();

    let client = Client::new();
    let created = send_notification(&client, &unique_user_id(), "Order shipped").await;
    let id = created.get("id").unwrap().as_str().unwrap();

    for _ in 0..2 {
        let response = client
            .patch(format!("http://{}/notifications/{id}/read", address()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated.get("read").unwrap(), true);
    }
}

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub"]
async fn malformed_id_not_found() {
    init_env();

    let client = Client::new();

    let response = client
        .get(format!("http://{}/notifications/123", address()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub"]
async fn health_ok() {
    init_env();

    let client = Client::new();

    let response = client
        .get(format!("http://{}/health", address()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health.get("status").unwrap(), "ok");
    assert!(health.get("transports").unwrap().get("kafka").is_some());
    assert!(health.get("transports").unwrap().get("rabbitmq").is_some());
}

async fn send_notification(client: &Client, user_id: &str, title: &str) -> Value {
    let response = client
        .post(format!("http://{}/notifications/send", address()))
        .header(CONTENT_TYPE, "application/json")
        .body(
            json!({
                "userId": user_id,
                "title": title,
                "message": "Your order #123 shipped",
                "type": "ORDER",
                "priority": "HIGH"
            })
            .to_string(),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await
}

async fn body_json(response: reqwest::Response) -> Value {
    let body = response.bytes().await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

mod common;
pub use common::*;

use amqprs::{
    channel::{BasicPublishArguments, Channel},
    connection::{Connection, OpenConnectionArguments},
    BasicProperties,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use serial_test::parallel;
use std::time::Duration;

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub and RabbitMQ"]
async fn invalid_message_skipped_valid_message_saved() {
    init_env();

    // invalid message is rejected and consuming continues,
    // so message published after it is saved

    let (connection, channel) = open_channel().await;
    let user_id = unique_user_id();

    publish(&channel, b"{ definitely not json".to_vec()).await;
    publish(
        &channel,
        json!({
            "userId": user_id,
            "title": "Order shipped",
            "message": "Your order #123 shipped",
            "type": "ORDER",
            "idempotencyKey": format!("{user_id}-order-shipped")
        })
        .to_string()
        .into_bytes(),
    )
    .await;

    let page = wait_for_notifications(&user_id, 1).await;
    let notification = &page.get("data").unwrap().as_array().unwrap()[0];
    assert_eq!(notification.get("title").unwrap(), "Order shipped");
    assert_eq!(notification.get("priority").unwrap(), "MEDIUM");

    channel.close().await.unwrap();
    connection.close().await.unwrap();
}

#[tokio::test]
#[parallel]
#[ignore = "requires running notification-hub and RabbitMQ"]
async fn duplicated_message_saved_once() {
    init_env();

    let (connection, channel) = open_channel().await;
    let user_id = unique_user_id();
    let message = json!({
        "userId": user_id,
        "title": "Order shipped",
        "message": "Your order #123 shipped",
        "type": "ORDER",
        "idempotencyKey": format!("{user_id}-duplicated")
    })
    .to_string()
    .into_bytes();

    publish(&channel, message.clone()).await;
    publish(&channel, message).await;

    wait_for_notifications(&user_id, 1).await;

    // give consumer time to process the duplicate
    tokio::time::sleep(Duration::from_millis(500)).await;
    let page = find_notifications(&user_id).await;
    assert_eq!(page.get("total").unwrap(), 1);

    channel.close().await.unwrap();
    connection.close().await.unwrap();
}

async fn open_channel() -> (Connection, Channel) {
    let connection_string = rabbitmq_connection_string();
    let open_args = OpenConnectionArguments::try_from(connection_string.as_str()).unwrap();
    let connection = Connection::open(&open_args).await.unwrap();
    let channel = connection.open_channel(None).await.unwrap();

    (connection, channel)
}

async fn publish(channel: &Channel, content: Vec<u8>) {
    let args = BasicPublishArguments::new("", &rabbitmq_queue_name());
    channel
        .basic_publish(BasicProperties::default(), content, args)
        .await
        .unwrap();
}

async fn wait_for_notifications(user_id: &str, total: u64) -> Value {
    for _ in 0..50 {
        let page = find_notifications(user_id).await;
        if page.get("total").unwrap().as_u64() == Some(total) {
            return page;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    panic!("notifications of {user_id} not saved in time");
}

async fn find_notifications(user_id: &str) -> Value {
    let response = Client::new()
        .get(format!(
            "http://{}/notifications?userId={user_id}",
            address()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.bytes().await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

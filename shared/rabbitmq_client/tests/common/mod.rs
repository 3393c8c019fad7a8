use amqprs::connection::{Connection, OpenConnectionArguments};
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

pub fn init_test_environment() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_target(false)
        .with_test_writer()
        .init();
}

fn open_connection_args() -> OpenConnectionArguments {
    let uri = std::env::var("TEST_RABBITMQ_CONNECTION_URI").unwrap();
    OpenConnectionArguments::try_from(uri.as_str()).unwrap()
}

pub async fn create_connection() -> Connection {
    Connection::open(&open_connection_args()).await.unwrap()
}

pub async fn create_rabbitmq_connection() -> RabbitmqConnection {
    let config = RabbitmqConnectionConfig {
        retry_interval: Duration::from_secs(1),
    };

    RabbitmqConnection::new(config, open_connection_args())
        .await
        .unwrap()
}

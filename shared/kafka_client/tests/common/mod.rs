use kafka_client::{KafkaConsumerConfig, RetryPolicy};
use rdkafka::{
    producer::{FutureProducer, FutureRecord},
    ClientConfig,
};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

pub fn init_test_environment() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_target(false)
        .with_test_writer()
        .init();
}

pub fn brokers() -> String {
    std::env::var("TEST_KAFKA_BROKERS").unwrap()
}

pub fn consumer_config(topic: &str, brokers: String) -> KafkaConsumerConfig {
    KafkaConsumerConfig {
        brokers,
        topic: topic.to_string(),
        group_id: format!("test {topic}"),
        client_id: "kafka_client tests".to_string(),
        retry_policy: RetryPolicy {
            max_count: 2,
            initial_interval: Duration::from_millis(100),
        },
        metadata_timeout: Duration::from_secs(2),
    }
}

pub async fn produce(topic: &str, payload: &[u8]) {
    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", brokers())
        .create()
        .unwrap();

    producer
        .send(
            FutureRecord::<(), [u8]>::to(topic).payload(payload),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
}

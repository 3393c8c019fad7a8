use serde::Deserialize;

///
/// Notification submitted through HTTP or one of the brokers.
/// Every field is optional at this stage, required ones are checked
/// by the notifications service so that missing fields end as validation errors.
///
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub priority: Option<String>,
    pub link: Option<String>,
    pub idempotency_key: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn notification_request_json_deserialize_ok() {
        let json = r#"{
            "userId": "u1",
            "title": "Order shipped",
            "message": "Your order #123 shipped",
            "type": "ORDER",
            "priority": "HIGH",
            "link": "/orders/123",
            "idempotencyKey": "order-123-shipped"
        }"#;

        let request = serde_json::from_str::<NotificationRequest>(json).unwrap();

        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert_eq!(request.notification_type.as_deref(), Some("ORDER"));
        assert_eq!(request.priority.as_deref(), Some("HIGH"));
        assert_eq!(request.idempotency_key.as_deref(), Some("order-123-shipped"));
    }

    #[test]
    fn notification_request_json_missing_fields_are_none() {
        let request = serde_json::from_str::<NotificationRequest>(r#"{"title": "t"}"#).unwrap();

        assert_eq!(request.user_id, None);
        assert_eq!(request.priority, None);
        assert_eq!(request.link, None);
    }

    #[test]
    fn notification_request_json_wrong_type_fails() {
        let request = serde_json::from_str::<NotificationRequest>(r#"{"userId": 12}"#);

        assert!(request.is_err());
    }
}

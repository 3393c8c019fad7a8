use crate::dto::output;
use axum::response::sse::Event;
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub const NOTIFICATION_EVENT: &str = "notification";
pub const HEARTBEAT_EVENT: &str = "heartbeat";

#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Notification(Arc<output::Notification>),
    Heartbeat(OffsetDateTime),
}

impl StreamFrame {
    pub fn into_event(self) -> Result<Event, axum::Error> {
        match self {
            StreamFrame::Notification(notification) => Event::default()
                .event(NOTIFICATION_EVENT)
                .id(&notification.id)
                .json_data(notification.as_ref()),
            StreamFrame::Heartbeat(at) => {
                let data = at.format(&Rfc3339).map_err(axum::Error::new)?;
                Ok(Event::default().event(HEARTBEAT_EVENT).data(data))
            }
        }
    }
}

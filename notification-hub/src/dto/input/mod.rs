mod notification_request;
mod pagination;
mod subscriber;

pub use notification_request::*;
pub use pagination::*;
pub use subscriber::*;

mod deleted_notification;
mod health;
mod notification;
mod notifications_page;

pub use deleted_notification::*;
pub use health::*;
pub use notification::*;
pub use notifications_page::*;

mod new_notification;
mod notification;

pub use new_notification::*;
pub use notification::*;

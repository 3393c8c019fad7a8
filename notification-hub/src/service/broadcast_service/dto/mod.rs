mod broadcast_service_config;
mod connection_id;
mod stream_frame;
mod subscription;

pub use broadcast_service_config::*;
pub use connection_id::*;
pub use stream_frame::*;
pub use subscription::*;

mod broadcast_service;
mod broadcast_service_impl;
mod connection_registry;
mod dto;
mod error;
mod stream_connection;

pub use broadcast_service::*;
pub use broadcast_service_impl::*;
pub use dto::{BroadcastServiceConfig, ConnectionId, StreamFrame, Subscription};

//! WebSocket transport between the canvas client and its session

pub mod handler;
pub mod protocol;

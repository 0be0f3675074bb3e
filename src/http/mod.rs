//! HTTP surface: canvas page, health check, socket upgrade

pub mod routes;

pub use routes::build_router;

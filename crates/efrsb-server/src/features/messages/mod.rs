//! Bankruptcy message feature: interactive parsing and search

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::{messages_routes, parse_routes};

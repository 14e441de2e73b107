pub mod auth;
pub mod initialization;
pub mod middleware;
pub mod notifications;
pub mod tracing;
pub mod users;

pub mod cookies;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod notice;
pub mod router;
pub mod types;

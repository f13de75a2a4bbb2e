//! Request payloads and their conversion into typed domain values.

pub mod auth;
pub mod categories;
pub mod comments;
pub mod posts;
pub mod query;
pub mod users;

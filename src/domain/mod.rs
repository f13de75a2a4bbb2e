//! Domain entities and value objects independent from persistence.

pub mod auth;
pub mod category;
pub mod comment;
pub mod post;
pub mod social;
pub mod stats;
pub mod types;
pub mod user;

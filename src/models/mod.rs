//! Diesel row models and their conversions to domain types.

pub mod category;
pub mod comment;
pub mod config;
pub mod post;
pub mod social;
pub mod user;

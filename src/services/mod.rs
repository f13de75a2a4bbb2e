pub mod access;
pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod errors;
pub mod posts;
pub mod social;
pub mod users;
#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{ServiceError, ServiceResult};

//! # IO Module
//!
//! HTTP surface of the attendance tracker: bearer-token authentication,
//! the REST routers, and translation of domain errors into JSON responses.

pub mod auth;
pub mod error;
pub mod rest;

pub use auth::{HmacTokenVerifier, TokenVerifier};
pub use error::ApiError;

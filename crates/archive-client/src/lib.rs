//! Async client for the archive-management API.
//!
//! Every request carries a freshly issued HS256 bearer token. TLS
//! certificates of the service are not verified.

pub mod client;
pub mod token;

pub use client::{Client, ClientConfig, Error, Quality};
pub use token::TokenIssuer;

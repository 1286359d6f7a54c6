//! Directory index middleware for a small epoll HTTP server.
//!
//! A request that resolves to a directory under the configured root is
//! answered with a sortable HTML listing; a directory requested without its
//! trailing slash is redirected; anything else is passed down the chain.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod listing;
#[cfg(target_os = "linux")]
pub mod network;

pub use error::{Error, Result};

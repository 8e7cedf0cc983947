// ephemcache - volatile in-memory key-value cache server

#![recursion_limit = "256"]

pub mod cache;
pub mod config;
pub mod protocol;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use utils::error::{CacheError, Result};

//! Storage layer module.
//!
//! This module provides trait-based storage abstraction allowing different backends
//! to be used without changing the HTTP layer.

pub mod factory;
pub mod file;
pub mod memory;
pub mod redis;
pub mod sql;
pub mod traits;

pub use factory::create_storage;
pub use file::FileUserStore;
pub use memory::MemoryUserStore;
pub use redis::RedisUserStore;
pub use sql::{MySqlUserStore, PgUserStore};
pub use traits::UserStore;

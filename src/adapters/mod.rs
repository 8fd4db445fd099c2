// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing concrete port implementations.
//!
//! This module contains the concrete implementations of the ports: the
//! in-memory TTL cache, and the Redis-backed store and change channel behind
//! the `redis` feature.

pub mod memory_cache;

#[cfg(feature = "redis")]
pub mod redis_channel;
#[cfg(feature = "redis")]
pub mod redis_store;

// Re-export adapters based on feature flags
pub use memory_cache::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_channel::RedisChannel;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture configuration synchronization crate.
//!
//! This crate keeps an in-process cache of key/value configuration entries
//! eventually consistent with a durable store. Reads are cache-aside and
//! typed, a background loop pulls incremental changes at a fixed interval,
//! and an optional pub/sub channel pushes individual changes to every
//! instance bound to the same application namespace.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and conversion logic (`ConfigurationEntry`,
//!   `ValueKind`, errors)
//! - **Ports**: Trait definitions that define interfaces (`ConfigStore`,
//!   `ConfigCache`, `ChangeChannel`)
//! - **Adapters**: Implementations of the ports (in-memory TTL cache, Redis
//!   store, Redis pub/sub channel)
//! - **Service**: The configuration reader that orchestrates everything
//!
//! # Degradation model
//!
//! Read paths never fail on store trouble: a miss with an unreachable store,
//! an inactive entry, or a value that does not convert to the requested type
//! all yield the type's zero value with a log line. Write paths propagate
//! store errors unmodified so callers know the write did not happen.
//!
//! # Feature Flags
//!
//! - `redis`: Enable the Redis store and pub/sub channel adapters (default)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dynconf::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let reader = ConfigReader::builder(
//!     "service-a",
//!     "redis://localhost:6379",
//!     Duration::from_secs(30),
//! )
//! .build()?;
//!
//! let site_name: String = reader.get_value("SiteName")?;
//! let is_basket_enabled: bool = reader.get_value("IsBasketEnabled")?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{ConfigError, ConfigurationEntry, FromEntryValue, Result, ValueKind};
    pub use crate::ports::{ChangeChannel, ConfigCache, ConfigStore, EntryCallback};
    pub use crate::service::{ConfigReader, ConfigReaderBuilder};

    pub use crate::adapters::MemoryCache;

    // Re-export adapters based on feature flags
    #[cfg(feature = "redis")]
    pub use crate::adapters::{RedisChannel, RedisStore};
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and conversion logic.
//!
//! This module contains the fundamental concepts used throughout the crate:
//! the configuration entry record, its declared value kind, typed conversion,
//! and the error types. It is independent of any storage or transport concern.

pub mod entry;
pub mod errors;
pub mod value;

// Re-export commonly used types
pub use entry::{ConfigurationEntry, ValueKind};
pub use errors::{ConfigError, Result};
pub use value::FromEntryValue;

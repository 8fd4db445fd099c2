// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing the trait seams of the crate.
//!
//! This module contains the trait definitions that the reader orchestrates:
//! the durable store gateway, the synchronized cache, and the change
//! notification channel. Concrete implementations live in the adapters layer
//! or are injected by the caller.

pub mod cache;
pub mod channel;
pub mod store;

pub use cache::ConfigCache;
pub use channel::{ChangeChannel, EntryCallback};
pub use store::ConfigStore;

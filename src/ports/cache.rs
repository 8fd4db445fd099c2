// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronized cache trait definition.
//!
//! This module defines the `ConfigCache` trait, the port to the in-memory
//! cache that serves reads with bounded staleness. The cache holds, per
//! application namespace, a keyed map of entries, an all-entries view, and a
//! last-sync timestamp; each stored item expires independently after the
//! cache's TTL.

use crate::domain::ConfigurationEntry;
use chrono::{DateTime, Utc};

/// The in-memory cache shared between readers, the refresh loop, and the
/// notification callback.
///
/// All methods take `&self`; implementations use interior mutability and must
/// be `Send + Sync`. None of the operations can fail: a cache that has lost
/// an item simply reports it absent and the reader falls back to the store.
pub trait ConfigCache: Send + Sync {
    /// Returns the cached entry, or `None` if never populated or expired.
    fn get(&self, app: &str, key: &str) -> Option<ConfigurationEntry>;

    /// Returns the all-entries view for the namespace; empty when absent.
    fn get_all(&self, app: &str) -> Vec<ConfigurationEntry>;

    /// Inserts or replaces one entry by `(application_name, name)`.
    ///
    /// When the all-entries view for the namespace is present it is updated
    /// in place (replace by name, or append); when absent it is left
    /// untouched. A reader seeing only the singular cache is a valid
    /// transient state.
    fn set(&self, entry: ConfigurationEntry);

    /// Replaces the all-entries view wholesale and warms the singular cache
    /// with each entry so subsequent point reads hit.
    fn set_all(&self, app: &str, entries: Vec<ConfigurationEntry>);

    /// Removes one entry from both the singular cache and the all-entries
    /// view. Idempotent.
    fn remove(&self, app: &str, key: &str);

    /// Returns the namespace's last-sync timestamp, or `None` when unset or
    /// expired. Callers treat `None` as the minimum timestamp.
    fn last_update_time(&self, app: &str) -> Option<DateTime<Utc>>;

    /// Records the namespace's last-sync timestamp.
    fn set_last_update_time(&self, app: &str, at: DateTime<Utc>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ConfigCache>();
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store gateway trait definition.
//!
//! This module defines the `ConfigStore` trait, the port to the durable
//! source of truth for configuration entries. The reader consults it on
//! cache misses, during the pull-refresh loop, and for every mutation.

use crate::domain::{ConfigurationEntry, Result};
use chrono::{DateTime, Utc};

/// The durable store for configuration entries.
///
/// Implementations are responsible for assigning entry ids on insert and for
/// stamping `created_at`/`updated_at` on insert/replace. Lookups and deletes
/// given an id the store does not recognize (including malformed ids) must
/// report "not found" rather than error.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the reader shares one store handle
/// between foreground callers and the background refresh thread.
///
/// # Examples
///
/// ```rust
/// use dynconf::domain::{ConfigurationEntry, Result};
/// use dynconf::ports::ConfigStore;
/// use chrono::{DateTime, Utc};
///
/// struct EmptyStore;
///
/// impl ConfigStore for EmptyStore {
///     fn get(&self, _app: &str, _key: &str) -> Result<Option<ConfigurationEntry>> {
///         Ok(None)
///     }
///
///     fn get_by_id(&self, _id: &str) -> Result<Option<ConfigurationEntry>> {
///         Ok(None)
///     }
///
///     fn all_active(&self, _app: &str) -> Result<Vec<ConfigurationEntry>> {
///         Ok(vec![])
///     }
///
///     fn changed_since(
///         &self,
///         _app: &str,
///         _since: DateTime<Utc>,
///     ) -> Result<Vec<ConfigurationEntry>> {
///         Ok(vec![])
///     }
///
///     fn insert(&self, entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
///         Ok(entry)
///     }
///
///     fn replace(&self, entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
///         Ok(entry)
///     }
///
///     fn delete(&self, _id: &str) -> Result<bool> {
///         Ok(false)
///     }
/// }
/// ```
pub trait ConfigStore: Send + Sync {
    /// Fetches a single entry by application namespace and key.
    fn get(&self, app: &str, key: &str) -> Result<Option<ConfigurationEntry>>;

    /// Fetches a single entry by its store-assigned id.
    ///
    /// A malformed or unknown id yields `Ok(None)`, never an error.
    fn get_by_id(&self, id: &str) -> Result<Option<ConfigurationEntry>>;

    /// Fetches every active entry in the application namespace.
    fn all_active(&self, app: &str) -> Result<Vec<ConfigurationEntry>>;

    /// Fetches entries of the namespace changed strictly after `since`.
    ///
    /// Inactive entries are included so deletions propagate to pull-based
    /// subscribers.
    fn changed_since(&self, app: &str, since: DateTime<Utc>)
        -> Result<Vec<ConfigurationEntry>>;

    /// Persists a new entry, assigning an id and stamping both timestamps.
    ///
    /// Returns the persisted entry as stored.
    fn insert(&self, entry: ConfigurationEntry) -> Result<ConfigurationEntry>;

    /// Replaces an existing entry, restamping `updated_at`.
    ///
    /// Returns the persisted entry as stored.
    fn replace(&self, entry: ConfigurationEntry) -> Result<ConfigurationEntry>;

    /// Deletes an entry by id. Returns whether anything was deleted.
    fn delete(&self, id: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ConfigStore>();
    }
}

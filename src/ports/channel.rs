// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change channel trait definition.
//!
//! This module defines the `ChangeChannel` trait, the port to the pub/sub
//! transport that fans a single changed entry out to every instance bound to
//! the same application namespace.

use crate::domain::{ConfigurationEntry, Result};
use std::sync::Arc;

/// Type alias for change notification callbacks.
///
/// The callback receives the full changed entry, including tombstones
/// (deleted entries delivered with `is_active` cleared).
pub type EntryCallback = Arc<dyn Fn(ConfigurationEntry) + Send + Sync>;

/// A publish/subscribe transport for configuration changes.
///
/// Publishing is fire-and-forget: implementations log delivery failures and
/// must never block the surrounding write path indefinitely. Subscription
/// delivers only entries whose namespace matches; delivery across different
/// keys is unordered and the same key may arrive out of order, so consumers
/// apply last-write-wins.
pub trait ChangeChannel: Send + Sync {
    /// Publishes one changed entry to every subscriber of its namespace.
    ///
    /// Best-effort; failures are logged by the channel, never surfaced.
    fn publish(&self, entry: &ConfigurationEntry);

    /// Starts delivering changes for `app` to `callback` on a background
    /// thread of execution.
    ///
    /// # Errors
    ///
    /// Returns an error if a subscription is already running or the
    /// transport cannot be reached.
    fn subscribe(&self, app: &str, callback: EntryCallback) -> Result<()>;

    /// Stops delivering changes and releases the subscription. Idempotent.
    fn stop_listening(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigurationEntry;
    use std::sync::Mutex;

    struct RecordingChannel {
        published: Mutex<Vec<ConfigurationEntry>>,
    }

    impl ChangeChannel for RecordingChannel {
        fn publish(&self, entry: &ConfigurationEntry) {
            self.published.lock().unwrap().push(entry.clone());
        }

        fn subscribe(&self, _app: &str, _callback: EntryCallback) -> Result<()> {
            Ok(())
        }

        fn stop_listening(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_publish_records_entry() {
        let channel = RecordingChannel {
            published: Mutex::new(Vec::new()),
        };
        let entry = ConfigurationEntry::new("app", "key", "v", "string");
        channel.publish(&entry);
        assert_eq!(channel.published.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_channel_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ChangeChannel>();
    }
}

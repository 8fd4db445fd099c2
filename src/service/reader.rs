// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration reader implementation.
//!
//! This module provides `ConfigReader`, the orchestrator of the crate. A
//! reader is bound to one application namespace and combines cache-aside
//! typed reads, writes that flow store-then-cache-then-channel, a periodic
//! pull-refresh loop, and optional push-notification ingestion.

use crate::adapters::MemoryCache;
#[cfg(feature = "redis")]
use crate::adapters::{RedisChannel, RedisStore};
use crate::domain::{ConfigError, ConfigurationEntry, FromEntryValue, Result};
use crate::ports::{ChangeChannel, ConfigCache, ConfigStore, EntryCallback};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Shared state between the reader, its refresh timer thread, and the
/// notification callback.
struct ReaderInner {
    application: String,
    store: Arc<dyn ConfigStore>,
    cache: Arc<dyn ConfigCache>,
    channel: Option<Arc<dyn ChangeChannel>>,
    /// Single-flight gate shared by initialization and refresh.
    sync_gate: Mutex<()>,
}

impl ReaderInner {
    fn gate(&self) -> MutexGuard<'_, ()> {
        self.sync_gate.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies one changed entry to the cache: active entries are stored,
    /// tombstones evict.
    fn apply_change(&self, entry: ConfigurationEntry) {
        if entry.is_active {
            self.cache.set(entry);
        } else {
            self.cache.remove(&entry.application_name, &entry.name);
        }
    }

    /// First full load. Failure leaves the reader running with an empty
    /// cache; the pull-refresh loop retries on its own schedule.
    fn initialize(&self) {
        let _gate = self.gate();
        match self.store.all_active(&self.application) {
            Ok(entries) => {
                tracing::info!(
                    application = %self.application,
                    count = entries.len(),
                    "Loaded initial configuration"
                );
                self.cache.set_all(&self.application, entries);
                self.cache.set_last_update_time(&self.application, Utc::now());
            }
            Err(e) => {
                tracing::warn!(
                    application = %self.application,
                    error = %e,
                    "Initial configuration load failed; starting with an empty cache"
                );
            }
        }
    }

    /// Pulls entries changed since the last successful sync and folds them
    /// into the cache, republishing each on the change channel.
    fn refresh(&self) {
        let _gate = self.gate();
        let since = self
            .cache
            .last_update_time(&self.application)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        match self.store.changed_since(&self.application, since) {
            Ok(changed) => {
                if !changed.is_empty() {
                    tracing::debug!(
                        application = %self.application,
                        count = changed.len(),
                        "Refresh picked up changed entries"
                    );
                }
                for entry in changed {
                    if let Some(channel) = &self.channel {
                        channel.publish(&entry);
                    }
                    self.apply_change(entry);
                }
                // Advance even with zero changes so the same window is
                // never re-scanned.
                self.cache.set_last_update_time(&self.application, Utc::now());
            }
            Err(e) => {
                tracing::warn!(
                    application = %self.application,
                    error = %e,
                    "Refresh failed; keeping previous cache state"
                );
            }
        }
    }
}

/// Handle to the recurring refresh schedule.
struct RefreshTimer {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    fn start(inner: Arc<ReaderInner>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = channel();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => inner.refresh(),
                _ => {
                    tracing::debug!(application = %inner.application, "Refresh timer stopping");
                    break;
                }
            }
        });
        Self { stop_tx, handle }
    }

    fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}

/// A configuration reader bound to one application namespace.
///
/// Reads are cache-aside: a hit is served from memory, a miss fetches from
/// the store and populates the cache, and store failures on read paths
/// degrade to zero values instead of erroring. Writes persist to the store
/// first, then update the cache, then publish on the change channel when one
/// is configured. A background timer pulls incremental changes at a fixed
/// interval.
///
/// Dropping the reader stops the timer and the channel subscription; calling
/// [`dispose`](ConfigReader::dispose) earlier does the same and is
/// idempotent.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconf::service::ConfigReader;
/// use std::time::Duration;
///
/// # fn main() -> dynconf::domain::Result<()> {
/// let reader = ConfigReader::builder(
///     "service-a",
///     "redis://localhost:6379",
///     Duration::from_secs(30),
/// )
/// .build()?;
///
/// let site_name: String = reader.get_value("SiteName")?;
/// let max_items: i32 = reader.get_value("MaxItemCount")?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigReader {
    inner: Arc<ReaderInner>,
    timer: Mutex<Option<RefreshTimer>>,
    refresh_interval: Duration,
}

impl ConfigReader {
    /// Creates a builder for a reader bound to `application`.
    ///
    /// The connection string configures the default store and channel
    /// adapters; injected instances take precedence over it.
    pub fn builder(
        application: impl Into<String>,
        connection: impl Into<String>,
        refresh_interval: Duration,
    ) -> ConfigReaderBuilder {
        ConfigReaderBuilder {
            application: application.into(),
            connection: connection.into(),
            refresh_interval,
            store: None,
            cache: None,
            channel: None,
        }
    }

    /// Returns the bound application namespace.
    pub fn application(&self) -> &str {
        &self.inner.application
    }

    /// Returns the typed value of an active configuration entry.
    ///
    /// Absent, inactive, and unconvertible entries all yield the type's
    /// zero value; only an empty key errors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `key` is empty or whitespace.
    pub fn get_value<T: FromEntryValue>(&self, key: &str) -> Result<T> {
        if key.trim().is_empty() {
            return Err(ConfigError::invalid_argument(
                "configuration key must not be empty",
            ));
        }

        let entry = match self.inner.cache.get(&self.inner.application, key) {
            Some(entry) => Some(entry),
            None => match self.inner.store.get(&self.inner.application, key) {
                Ok(Some(entry)) => {
                    self.inner.cache.set(entry.clone());
                    Some(entry)
                }
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(
                        application = %self.inner.application,
                        key,
                        error = %e,
                        "Store lookup failed; treating key as absent"
                    );
                    None
                }
            },
        };

        let Some(entry) = entry else {
            return Ok(T::default());
        };
        if !entry.is_active {
            return Ok(T::default());
        }

        match T::from_entry_value(&entry.value, entry.kind()) {
            Some(value) => Ok(value),
            None => {
                tracing::warn!(
                    entry = %entry,
                    value = %entry.value,
                    declared_type = %entry.value_type,
                    "Value conversion failed; returning zero value"
                );
                Ok(T::default())
            }
        }
    }

    /// Returns every active entry of the bound namespace.
    ///
    /// Served from the cached all-entries view when present; otherwise
    /// fetched from the store and cached. Store failure degrades to an
    /// empty list.
    pub fn get_all_configurations(&self) -> Vec<ConfigurationEntry> {
        let cached = self.inner.cache.get_all(&self.inner.application);
        if !cached.is_empty() {
            return cached;
        }

        match self.inner.store.all_active(&self.inner.application) {
            Ok(entries) => {
                self.inner
                    .cache
                    .set_all(&self.inner.application, entries.clone());
                entries
            }
            Err(e) => {
                tracing::warn!(
                    application = %self.inner.application,
                    error = %e,
                    "Store listing failed; returning empty configuration"
                );
                Vec::new()
            }
        }
    }

    /// Persists a new entry, updates the cache, and publishes the change.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationMismatch` when the entry belongs to another
    /// namespace, and propagates store failures unmodified so the caller
    /// knows the write did not happen.
    pub fn add_configuration(&self, entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
        self.ensure_namespace(&entry)?;
        let persisted = self.inner.store.insert(entry)?;
        self.inner.cache.set(persisted.clone());
        if let Some(channel) = &self.inner.channel {
            channel.publish(&persisted);
        }
        tracing::info!(entry = %persisted, "Added configuration entry");
        Ok(persisted)
    }

    /// Replaces an existing entry, updates the cache, and publishes the
    /// change.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationMismatch` when the entry belongs to another
    /// namespace, and propagates store failures unmodified.
    pub fn update_configuration(&self, entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
        self.ensure_namespace(&entry)?;
        let persisted = self.inner.store.replace(entry)?;
        self.inner.cache.set(persisted.clone());
        if let Some(channel) = &self.inner.channel {
            channel.publish(&persisted);
        }
        tracing::info!(entry = %persisted, "Updated configuration entry");
        Ok(persisted)
    }

    /// Deletes an entry by id.
    ///
    /// Returns `Ok(false)` without side effects for unknown ids and for
    /// entries bound to another namespace. On success the entry is evicted
    /// from the cache and a tombstone (the entry with `is_active` cleared)
    /// is published so subscribers converge without a second fetch.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty id and propagates store
    /// failures unmodified.
    pub fn delete_configuration(&self, id: &str) -> Result<bool> {
        if id.trim().is_empty() {
            return Err(ConfigError::invalid_argument(
                "configuration id must not be empty",
            ));
        }

        let Some(entry) = self.inner.store.get_by_id(id)? else {
            return Ok(false);
        };
        if entry.application_name != self.inner.application {
            return Ok(false);
        }

        if !self.inner.store.delete(id)? {
            return Ok(false);
        }

        self.inner
            .cache
            .remove(&entry.application_name, &entry.name);
        if let Some(channel) = &self.inner.channel {
            let mut tombstone = entry;
            tombstone.is_active = false;
            channel.publish(&tombstone);
        }
        Ok(true)
    }

    /// Pulls entries changed since the last successful sync into the cache.
    ///
    /// Single-flight with initialization and with concurrent refreshes; a
    /// store failure is logged and the previous cache state stays
    /// authoritative.
    pub fn refresh(&self) {
        self.inner.refresh();
    }

    /// Arms the recurring refresh timer, replacing any existing schedule.
    pub fn start_listening(&self) {
        let mut slot = self.timer_slot();
        if let Some(timer) = slot.take() {
            timer.stop();
        }
        *slot = Some(RefreshTimer::start(
            Arc::clone(&self.inner),
            self.refresh_interval,
        ));
    }

    /// Cancels the recurring refresh timer. Idempotent.
    pub fn stop_listening(&self) {
        if let Some(timer) = self.timer_slot().take() {
            timer.stop();
        }
    }

    /// Releases the refresh schedule and the channel subscription.
    /// Idempotent; also invoked on drop.
    pub fn dispose(&self) {
        self.stop_listening();
        if let Some(channel) = &self.inner.channel {
            if let Err(e) = channel.stop_listening() {
                tracing::warn!(error = %e, "Failed to stop change channel subscription");
            }
        }
    }

    fn ensure_namespace(&self, entry: &ConfigurationEntry) -> Result<()> {
        if entry.application_name != self.inner.application {
            return Err(ConfigError::ApplicationMismatch {
                expected: self.inner.application.clone(),
                actual: entry.application_name.clone(),
            });
        }
        Ok(())
    }

    fn timer_slot(&self) -> MutexGuard<'_, Option<RefreshTimer>> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for ConfigReader {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Builder for constructing a [`ConfigReader`].
///
/// Omitted ports fall back to the default adapters: a Redis store and
/// channel built from the connection string (with the `redis` feature), and
/// the in-memory TTL cache.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconf::service::ConfigReader;
/// use std::time::Duration;
///
/// # fn main() -> dynconf::domain::Result<()> {
/// let reader = ConfigReader::builder(
///     "service-a",
///     "redis://localhost:6379",
///     Duration::from_secs(30),
/// )
/// .with_notifications()
/// .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigReaderBuilder {
    application: String,
    connection: String,
    refresh_interval: Duration,
    store: Option<Arc<dyn ConfigStore>>,
    cache: Option<Arc<dyn ConfigCache>>,
    channel: Option<Arc<dyn ChangeChannel>>,
}

impl ConfigReaderBuilder {
    /// Injects a store, overriding the default Redis adapter.
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Injects a cache, overriding the default in-memory TTL cache.
    pub fn cache(mut self, cache: Arc<dyn ConfigCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Injects a change channel. Without one the reader relies on
    /// pull-refresh alone.
    pub fn channel(mut self, channel: Arc<dyn ChangeChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Enables push notifications over the default Redis pub/sub channel
    /// built from the connection string.
    ///
    /// An unreachable channel is logged and the reader runs with
    /// pull-refresh only.
    #[cfg(feature = "redis")]
    pub fn with_notifications(self) -> Self {
        let connection = self.connection.clone();
        match RedisChannel::connect(&connection) {
            Ok(channel) => self.channel(Arc::new(channel)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Change channel unavailable; falling back to pull-refresh only"
                );
                self
            }
        }
    }

    /// Validates the options, performs the first full load, subscribes to
    /// the change channel, and arms the refresh timer.
    ///
    /// The first load failing leaves the reader running degraded with an
    /// empty cache; only an unusable store handle or invalid options fail
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty application name, an empty
    /// connection string, or a zero refresh interval, and a `StoreError`
    /// when the default store cannot be created.
    pub fn build(self) -> Result<ConfigReader> {
        if self.application.trim().is_empty() {
            return Err(ConfigError::invalid_argument(
                "application name must not be empty",
            ));
        }
        if self.connection.trim().is_empty() {
            return Err(ConfigError::invalid_argument(
                "connection string must not be empty",
            ));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::invalid_argument(
                "refresh interval must be greater than zero",
            ));
        }

        let store = match self.store {
            Some(store) => store,
            None => {
                #[cfg(feature = "redis")]
                {
                    Arc::new(RedisStore::connect(&self.connection)?) as Arc<dyn ConfigStore>
                }
                #[cfg(not(feature = "redis"))]
                {
                    return Err(ConfigError::invalid_argument(
                        "no store was provided and the default Redis store is not compiled in",
                    ));
                }
            }
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new()) as Arc<dyn ConfigCache>);

        let inner = Arc::new(ReaderInner {
            application: self.application,
            store,
            cache,
            channel: self.channel,
            sync_gate: Mutex::new(()),
        });

        if let Some(channel) = &inner.channel {
            // Weak so the subscription does not keep the reader state alive.
            let callback: EntryCallback = {
                let inner = Arc::downgrade(&inner);
                Arc::new(move |entry: ConfigurationEntry| {
                    if let Some(inner) = inner.upgrade() {
                        tracing::debug!(entry = %entry, "Applying pushed configuration change");
                        inner.apply_change(entry);
                    }
                })
            };
            if let Err(e) = channel.subscribe(&inner.application, callback) {
                tracing::warn!(
                    application = %inner.application,
                    error = %e,
                    "Change channel subscription failed; running with pull-refresh only"
                );
            }
        }

        inner.initialize();

        let reader = ConfigReader {
            inner: Arc::clone(&inner),
            timer: Mutex::new(None),
            refresh_interval: self.refresh_interval,
        };
        reader.start_listening();
        Ok(reader)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis pub/sub change channel adapter.
//!
//! This module provides `RedisChannel`, a `ChangeChannel` that publishes
//! changed entries as JSON on `configchange:{application}` and delivers
//! incoming messages to a callback from a background thread.

use crate::domain::{ConfigError, ConfigurationEntry, Result};
use crate::ports::{ChangeChannel, EntryCallback};
use redis::Client;
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn channel_name(app: &str) -> String {
    format!("configchange:{}", app)
}

/// Running subscription state.
#[derive(Debug)]
struct Listener {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// A Redis pub/sub implementation of [`ChangeChannel`].
///
/// Publishing opens a short-lived connection per message and never surfaces
/// failures; the pull-refresh loop covers any message lost this way. The
/// subscriber thread reconnects with backoff when the server drops it and
/// ignores payloads addressed to other application namespaces.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconf::adapters::RedisChannel;
/// use dynconf::ports::ChangeChannel;
/// use std::sync::Arc;
///
/// # fn main() -> dynconf::domain::Result<()> {
/// let channel = RedisChannel::connect("redis://localhost:6379")?;
/// channel.subscribe(
///     "service-a",
///     Arc::new(|entry| {
///         println!("Configuration changed: {}", entry);
///     }),
/// )?;
///
/// // Later, stop listening
/// channel.stop_listening()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RedisChannel {
    url: String,
    listener: Mutex<Option<Listener>>,
}

impl RedisChannel {
    /// Creates a channel for the given connection URL and verifies the
    /// server is reachable.
    ///
    /// # Errors
    ///
    /// Returns a `ChannelError` when the URL is malformed or the server
    /// cannot be reached.
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| ConfigError::channel("Failed to create Redis client", e))?;

        // Test connection
        let _conn = client
            .get_connection()
            .map_err(|e| ConfigError::channel("Failed to connect to Redis", e))?;

        Ok(Self {
            url: url.to_string(),
            listener: Mutex::new(None),
        })
    }

    fn listener_slot(&self) -> std::sync::MutexGuard<'_, Option<Listener>> {
        self.listener.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChangeChannel for RedisChannel {
    fn publish(&self, entry: &ConfigurationEntry) {
        let payload = match serde_json::to_string(entry) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(entry = %entry, error = %e, "Failed to serialize change notification");
                return;
            }
        };

        let publish = || -> redis::RedisResult<()> {
            let client = Client::open(self.url.as_str())?;
            let mut conn = client.get_connection()?;
            redis::cmd("PUBLISH")
                .arg(channel_name(&entry.application_name))
                .arg(&payload)
                .query(&mut conn)
        };

        if let Err(e) = publish() {
            tracing::warn!(entry = %entry, error = %e, "Failed to publish change notification");
        }
    }

    fn subscribe(&self, app: &str, callback: EntryCallback) -> Result<()> {
        let mut slot = self.listener_slot();
        if slot.is_some() {
            return Err(ConfigError::ChannelError {
                message: "Channel subscription is already running".to_string(),
                source: None,
            });
        }

        let (stop_tx, stop_rx) = channel();
        let url = self.url.clone();
        let app = app.to_string();
        let subscribed_channel = channel_name(&app);

        let handle = thread::spawn(move || {
            loop {
                // Check for stop signal
                if stop_rx.try_recv().is_ok() {
                    tracing::debug!("Change channel listener stopping");
                    break;
                }

                let client = match Client::open(url.as_str()) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!("Failed to create Redis client for subscription: {}", e);
                        thread::sleep(Duration::from_secs(5));
                        continue;
                    }
                };

                let mut conn = match client.get_connection() {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!("Failed to connect to Redis for subscription: {}", e);
                        thread::sleep(Duration::from_secs(5));
                        continue;
                    }
                };

                let mut pubsub = conn.as_pubsub();
                if let Err(e) = pubsub.subscribe(&subscribed_channel) {
                    tracing::error!("Failed to subscribe to change channel: {}", e);
                    thread::sleep(Duration::from_secs(5));
                    continue;
                }
                tracing::info!(channel = %subscribed_channel, "Listening for configuration changes");

                // Process messages
                loop {
                    // Check for stop signal
                    if stop_rx.try_recv().is_ok() {
                        tracing::debug!("Change channel listener stopping");
                        return;
                    }

                    // Set a timeout to periodically check stop signal
                    pubsub.set_read_timeout(Some(Duration::from_millis(100))).ok();

                    match pubsub.get_message() {
                        Ok(msg) => {
                            let payload: String = match msg.get_payload() {
                                Ok(p) => p,
                                Err(e) => {
                                    tracing::warn!("Unreadable change notification payload: {}", e);
                                    continue;
                                }
                            };

                            let entry: ConfigurationEntry = match serde_json::from_str(&payload) {
                                Ok(entry) => entry,
                                Err(e) => {
                                    tracing::warn!("Skipping corrupt change notification: {}", e);
                                    continue;
                                }
                            };

                            // Shared-channel safety: drop payloads addressed
                            // to another namespace.
                            if entry.application_name != app {
                                tracing::debug!(
                                    entry = %entry,
                                    "Ignoring change notification for foreign namespace"
                                );
                                continue;
                            }

                            tracing::debug!(entry = %entry, "Received configuration change");
                            callback(entry);
                        }
                        Err(e) => {
                            // Timeout errors are expected when checking stop signal
                            if e.is_timeout() {
                                continue;
                            }
                            tracing::error!("Redis pub/sub error: {}", e);
                            break; // Reconnect
                        }
                    }
                }
            }
        });

        *slot = Some(Listener { stop_tx, handle });
        Ok(())
    }

    fn stop_listening(&self) -> Result<()> {
        let listener = self.listener_slot().take();
        if let Some(Listener { stop_tx, handle }) = listener {
            let _ = stop_tx.send(());
            handle.join().map_err(|_| ConfigError::ChannelError {
                message: "Failed to join change channel listener thread".to_string(),
                source: None,
            })?;
        }
        Ok(())
    }
}

impl Drop for RedisChannel {
    fn drop(&mut self) {
        let _ = self.stop_listening();
    }
}

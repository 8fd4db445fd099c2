// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis-backed configuration store adapter.
//!
//! This module provides `RedisStore`, a `ConfigStore` backed by Redis.
//! Each entry is stored as JSON under `config:{application}:{key}`, and each
//! application namespace keeps a set of its member keys at
//! `app:{application}` so listing never needs a server-wide key scan.

use crate::domain::{ConfigError, ConfigurationEntry, Result};
use crate::ports::ConfigStore;
use chrono::{DateTime, Utc};
use redis::{Client, Commands, Connection};

/// A Redis-backed implementation of [`ConfigStore`].
///
/// The store opens a fresh connection per operation; the client itself is
/// cheap to clone and holds no connection state.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconf::adapters::RedisStore;
/// use dynconf::domain::ConfigurationEntry;
/// use dynconf::ports::ConfigStore;
///
/// # fn main() -> dynconf::domain::Result<()> {
/// let store = RedisStore::connect("redis://localhost:6379")?;
/// let saved = store.insert(ConfigurationEntry::new(
///     "service-a", "MaxItemCount", "50", "int",
/// ))?;
/// assert!(saved.id.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RedisStore {
    client: Client,
}

fn entry_key(app: &str, key: &str) -> String {
    format!("config:{}:{}", app, key)
}

fn member_set_key(app: &str) -> String {
    format!("app:{}", app)
}

impl RedisStore {
    /// Creates a store for the given connection URL and verifies the server
    /// is reachable.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` when the URL is malformed or the server cannot
    /// be reached.
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| ConfigError::store("Failed to create Redis client", e))?;

        // Test connection
        let _conn = client
            .get_connection()
            .map_err(|e| ConfigError::store("Failed to connect to Redis", e))?;

        Ok(Self { client })
    }

    fn connection(&self) -> Result<Connection> {
        self.client
            .get_connection()
            .map_err(|e| ConfigError::store("Failed to connect to Redis", e))
    }

    /// Loads and parses one entry payload; a corrupt payload is logged and
    /// reported as absent.
    fn load_entry(&self, conn: &mut Connection, redis_key: &str) -> Result<Option<ConfigurationEntry>> {
        let payload: Option<String> = conn
            .get(redis_key)
            .map_err(|e| ConfigError::store("Failed to fetch entry from Redis", e))?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(key = %redis_key, error = %e, "Skipping corrupt entry payload");
                Ok(None)
            }
        }
    }

    /// Loads every entry of the namespace, active or not.
    fn load_namespace(&self, conn: &mut Connection, app: &str) -> Result<Vec<ConfigurationEntry>> {
        let members: Vec<String> = conn
            .smembers(member_set_key(app))
            .map_err(|e| ConfigError::store("Failed to list application keys from Redis", e))?;

        let mut entries = Vec::with_capacity(members.len());
        for member in members {
            if let Some(entry) = self.load_entry(conn, &entry_key(app, &member))? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Lists every application namespace present in the store via SCAN over
    /// the member-set keys.
    fn application_names(&self, conn: &mut Connection) -> Result<Vec<String>> {
        let mut cursor: u64 = 0;
        let mut apps = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg("app:*")
                .arg("COUNT")
                .arg(100)
                .query(conn)
                .map_err(|e| ConfigError::store("Failed to scan application sets from Redis", e))?;

            for key in keys {
                if let Some(app) = key.strip_prefix("app:") {
                    apps.push(app.to_string());
                }
            }
            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(apps)
    }

    fn find_by_id(&self, conn: &mut Connection, id: &str) -> Result<Option<ConfigurationEntry>> {
        for app in self.application_names(conn)? {
            for entry in self.load_namespace(conn, &app)? {
                if entry.id.as_deref() == Some(id) {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }

    fn write_entry(&self, conn: &mut Connection, entry: &ConfigurationEntry) -> Result<()> {
        let payload = serde_json::to_string(entry)
            .map_err(|e| ConfigError::store("Failed to serialize entry", e))?;

        let _: () = conn
            .set(entry_key(&entry.application_name, &entry.name), payload)
            .map_err(|e| ConfigError::store("Failed to write entry to Redis", e))?;

        let _: () = conn
            .sadd(member_set_key(&entry.application_name), &entry.name)
            .map_err(|e| ConfigError::store("Failed to register entry key in Redis", e))?;

        Ok(())
    }
}

impl ConfigStore for RedisStore {
    fn get(&self, app: &str, key: &str) -> Result<Option<ConfigurationEntry>> {
        let mut conn = self.connection()?;
        self.load_entry(&mut conn, &entry_key(app, key))
    }

    fn get_by_id(&self, id: &str) -> Result<Option<ConfigurationEntry>> {
        let mut conn = self.connection()?;
        self.find_by_id(&mut conn, id)
    }

    fn all_active(&self, app: &str) -> Result<Vec<ConfigurationEntry>> {
        let mut conn = self.connection()?;
        let mut entries = self.load_namespace(&mut conn, app)?;
        entries.retain(|e| e.is_active);
        Ok(entries)
    }

    fn changed_since(&self, app: &str, since: DateTime<Utc>) -> Result<Vec<ConfigurationEntry>> {
        let mut conn = self.connection()?;
        let mut entries = self.load_namespace(&mut conn, app)?;
        entries.retain(|e| e.updated_at > since);
        Ok(entries)
    }

    fn insert(&self, mut entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
        let mut conn = self.connection()?;
        if entry.id.is_none() {
            entry.id = Some(uuid::Uuid::new_v4().to_string());
        }
        let now = Utc::now();
        entry.created_at = now;
        entry.updated_at = now;
        self.write_entry(&mut conn, &entry)?;
        Ok(entry)
    }

    fn replace(&self, mut entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
        let mut conn = self.connection()?;
        entry.updated_at = Utc::now();
        self.write_entry(&mut conn, &entry)?;
        Ok(entry)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut conn = self.connection()?;
        let Some(entry) = self.find_by_id(&mut conn, id)? else {
            return Ok(false);
        };

        let removed: i64 = conn
            .del(entry_key(&entry.application_name, &entry.name))
            .map_err(|e| ConfigError::store("Failed to delete entry from Redis", e))?;

        let _: () = conn
            .srem(member_set_key(&entry.application_name), &entry.name)
            .map_err(|e| ConfigError::store("Failed to unregister entry key in Redis", e))?;

        Ok(removed > 0)
    }
}

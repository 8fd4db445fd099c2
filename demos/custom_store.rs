// SPDX-License-Identifier: MIT OR Apache-2.0

//! Custom store example for the configuration synchronization crate.
//!
//! This example demonstrates:
//! - Implementing the `ConfigStore` port for a custom backend
//! - Injecting the store into the reader builder
//! - How read paths degrade when the backend misbehaves
//!
//! No external services are required. To run this example:
//! ```bash
//! cargo run --example custom_store
//! ```

use chrono::{DateTime, Utc};
use dynconf::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A toy store keeping entries in a mutex-guarded map, standing in for any
/// backend that can implement the gateway operations.
#[derive(Default)]
struct InMemoryStore {
    entries: Mutex<HashMap<String, ConfigurationEntry>>,
    next_id: Mutex<u64>,
}

impl ConfigStore for InMemoryStore {
    fn get(&self, app: &str, key: &str) -> Result<Option<ConfigurationEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|e| e.application_name == app)
            .cloned())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<ConfigurationEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .find(|e| e.id.as_deref() == Some(id))
            .cloned())
    }

    fn all_active(&self, app: &str) -> Result<Vec<ConfigurationEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.application_name == app && e.is_active)
            .cloned()
            .collect())
    }

    fn changed_since(&self, app: &str, since: DateTime<Utc>) -> Result<Vec<ConfigurationEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.application_name == app && e.updated_at > since)
            .cloned()
            .collect())
    }

    fn insert(&self, mut entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        entry.id = Some(next_id.to_string());
        let now = Utc::now();
        entry.created_at = now;
        entry.updated_at = now;
        self.entries
            .lock()
            .unwrap()
            .insert(entry.name.clone(), entry.clone());
        Ok(entry)
    }

    fn replace(&self, mut entry: ConfigurationEntry) -> Result<ConfigurationEntry> {
        entry.updated_at = Utc::now();
        self.entries
            .lock()
            .unwrap()
            .insert(entry.name.clone(), entry.clone());
        Ok(entry)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let name = entries
            .values()
            .find(|e| e.id.as_deref() == Some(id))
            .map(|e| e.name.clone());
        Ok(match name {
            Some(name) => entries.remove(&name).is_some(),
            None => false,
        })
    }
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== dynconf: Custom Store ===\n");

    let store = Arc::new(InMemoryStore::default());
    let reader = ConfigReader::builder(
        "inventory",
        "memory://local",
        Duration::from_secs(5),
    )
    .store(store)
    .build()?;

    reader.add_configuration(ConfigurationEntry::new(
        "inventory",
        "WarehouseCount",
        "3",
        "int",
    ))?;
    reader.add_configuration(ConfigurationEntry::new(
        "inventory",
        "RestockEnabled",
        "yes",
        "bool",
    ))?;

    let warehouses: i32 = reader.get_value("WarehouseCount")?;
    let restock: bool = reader.get_value("RestockEnabled")?;
    println!("WarehouseCount = {}", warehouses);
    println!("RestockEnabled = {}\n", restock);

    // Writes to a foreign namespace are rejected before they reach the
    // store.
    let result = reader.add_configuration(ConfigurationEntry::new(
        "billing",
        "Currency",
        "EUR",
        "string",
    ));
    println!("Foreign-namespace write: {:?}", result.err());

    reader.dispose();
    println!("\n=== Done ===");
    Ok(())
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the configuration synchronization crate.
//!
//! This example demonstrates:
//! - Building a reader bound to one application namespace
//! - Writing entries through the reader (store, cache, and channel updated)
//! - Typed reads (string, int, bool, double) with zero-value fallback
//! - Deleting an entry by id
//!
//! To run this example:
//! ```bash
//! # Start a local Redis server
//! docker run --rm -p 6379:6379 redis:7-alpine
//!
//! # Run the example
//! cargo run --example basic_usage
//! ```

use dynconf::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== dynconf: Basic Usage ===\n");

    // One reader per process per application namespace. The connection
    // string configures the default Redis store and pub/sub channel.
    let reader = ConfigReader::builder(
        "service-a",
        "redis://localhost:6379",
        Duration::from_secs(30),
    )
    .with_notifications()
    .build()?;

    println!("Reader bound to namespace '{}'.\n", reader.application());

    // Example 1: Write some typed entries
    println!("--- Example 1: Writing Entries ---");
    let site = reader.add_configuration(ConfigurationEntry::new(
        "service-a",
        "SiteName",
        "soty.io",
        "string",
    ))?;
    println!("✓ Added {} (id: {:?})", site, site.id);

    reader.add_configuration(ConfigurationEntry::new(
        "service-a",
        "MaxItemCount",
        "50",
        "int",
    ))?;
    reader.add_configuration(ConfigurationEntry::new(
        "service-a",
        "IsBasketEnabled",
        "true",
        "bool",
    ))?;
    reader.add_configuration(ConfigurationEntry::new(
        "service-a",
        "DiscountRatio",
        "0.25",
        "double",
    ))?;
    println!("✓ Added MaxItemCount, IsBasketEnabled, DiscountRatio\n");

    // Example 2: Typed reads
    println!("--- Example 2: Typed Reads ---");
    let site_name: String = reader.get_value("SiteName")?;
    let max_items: i32 = reader.get_value("MaxItemCount")?;
    let basket: bool = reader.get_value("IsBasketEnabled")?;
    let ratio: f64 = reader.get_value("DiscountRatio")?;
    println!("SiteName        = {}", site_name);
    println!("MaxItemCount    = {}", max_items);
    println!("IsBasketEnabled = {}", basket);
    println!("DiscountRatio   = {}\n", ratio);

    // Example 3: Zero-value fallback
    println!("--- Example 3: Zero-Value Fallback ---");
    // An absent key never errors; the type's zero value comes back.
    let missing: i32 = reader.get_value("NoSuchKey")?;
    println!("NoSuchKey (absent)        = {}", missing);
    // Reading a key under the wrong type degrades the same way.
    let mistyped: bool = reader.get_value("MaxItemCount")?;
    println!("MaxItemCount as bool      = {}\n", mistyped);

    // Example 4: Listing and deleting
    println!("--- Example 4: Listing and Deleting ---");
    for entry in reader.get_all_configurations() {
        println!("  {} = {} ({})", entry.name, entry.value, entry.value_type);
    }
    if let Some(id) = site.id.as_deref() {
        let deleted = reader.delete_configuration(id)?;
        println!("\nDeleted SiteName: {}", deleted);
    }

    reader.dispose();
    println!("\n=== Done ===");
    Ok(())
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Redis adapters using Docker containers.

mod common;

#[cfg(feature = "redis")]
mod redis_tests {
    use chrono::{Duration as ChronoDuration, Utc};
    use dynconf::adapters::{RedisChannel, RedisStore};
    use dynconf::domain::ConfigurationEntry;
    use dynconf::ports::{ChangeChannel, ConfigStore};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};
    use testcontainers::{core::WaitFor, runners::SyncRunner, Container, GenericImage};

    use crate::common;

    /// Starts a Redis container and returns it with a connection URL, or
    /// `None` when Docker is unavailable.
    fn setup_redis() -> Option<(Container<GenericImage>, String)> {
        if !common::docker_available() {
            common::announce_skip("Redis integration test");
            return None;
        }

        let redis_image = GenericImage::new("redis", "7-alpine")
            .with_exposed_port(6379.into())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));

        let container = redis_image.start().ok()?;
        let port = container.get_host_port_ipv4(6379).ok()?;
        let url = format!("redis://127.0.0.1:{}", port);

        // Give Redis a moment to start up
        thread::sleep(Duration::from_millis(500));

        Some((container, url))
    }

    /// Polls `predicate` until it holds or the deadline passes.
    fn wait_for(predicate: impl Fn() -> bool, deadline: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if predicate() {
                return true;
            }
            thread::sleep(Duration::from_millis(50));
        }
        predicate()
    }

    #[test]
    fn test_store_crud_round_trip() {
        let Some((_container, url)) = setup_redis() else {
            return;
        };
        let store = RedisStore::connect(&url).unwrap();

        // Insert assigns an id and stamps timestamps.
        let entry = ConfigurationEntry::new("service-a", "SiteName", "soty.io", "string");
        let saved = store.insert(entry).unwrap();
        let id = saved.id.clone().unwrap();
        assert_eq!(saved.created_at, saved.updated_at);

        // Point lookup and id lookup agree.
        let fetched = store.get("service-a", "SiteName").unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(store.get_by_id(&id).unwrap().unwrap(), saved);
        assert!(store.get_by_id("no-such-id").unwrap().is_none());

        // Replace restamps updated_at but keeps created_at.
        let mut changed = saved.clone();
        changed.value = "sahibinden.com".to_string();
        let replaced = store.replace(changed).unwrap();
        assert!(replaced.updated_at > saved.updated_at);
        assert_eq!(replaced.created_at, saved.created_at);

        // Listing filters by namespace and activity.
        let mut inactive = ConfigurationEntry::new("service-a", "Hidden", "1", "int");
        inactive.is_active = false;
        store.insert(inactive).unwrap();
        store
            .insert(ConfigurationEntry::new("service-b", "Other", "2", "int"))
            .unwrap();

        let active = store.all_active("service-a").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "SiteName");

        // Incremental scan picks up only entries in the window.
        let since = replaced.updated_at - ChronoDuration::milliseconds(1);
        let changed = store.changed_since("service-a", since).unwrap();
        assert!(changed.iter().any(|e| e.name == "SiteName"));
        let future = Utc::now() + ChronoDuration::hours(1);
        assert!(store.changed_since("service-a", future).unwrap().is_empty());

        // Delete reports whether anything was removed.
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.get("service-a", "SiteName").unwrap().is_none());
    }

    #[test]
    fn test_store_skips_corrupt_payload() {
        let Some((_container, url)) = setup_redis() else {
            return;
        };
        let store = RedisStore::connect(&url).unwrap();
        store
            .insert(ConfigurationEntry::new("service-a", "Good", "1", "int"))
            .unwrap();

        // Plant a payload that is not valid entry JSON.
        let client = redis::Client::open(url.as_str()).unwrap();
        let mut conn = client.get_connection().unwrap();
        let _: () = redis::cmd("SET")
            .arg("config:service-a:Broken")
            .arg("not json")
            .query(&mut conn)
            .unwrap();
        let _: () = redis::cmd("SADD")
            .arg("app:service-a")
            .arg("Broken")
            .query(&mut conn)
            .unwrap();

        let active = store.all_active("service-a").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Good");
        assert!(store.get("service-a", "Broken").unwrap().is_none());
    }

    #[test]
    fn test_channel_delivers_matching_namespace_only() {
        let Some((_container, url)) = setup_redis() else {
            return;
        };

        let received = Arc::new(Mutex::new(Vec::<ConfigurationEntry>::new()));
        let subscriber = RedisChannel::connect(&url).unwrap();
        {
            let received = Arc::clone(&received);
            subscriber
                .subscribe(
                    "service-a",
                    Arc::new(move |entry| received.lock().unwrap().push(entry)),
                )
                .unwrap();
        }
        // Let the listener thread finish subscribing.
        thread::sleep(Duration::from_millis(300));

        let publisher = RedisChannel::connect(&url).unwrap();
        publisher.publish(&ConfigurationEntry::new(
            "service-a",
            "SiteName",
            "soty.io",
            "string",
        ));

        assert!(wait_for(
            || !received.lock().unwrap().is_empty(),
            Duration::from_secs(3)
        ));
        assert_eq!(received.lock().unwrap()[0].name, "SiteName");

        // A payload for another namespace smuggled onto the subscribed
        // channel is dropped by the adapter.
        let foreign = ConfigurationEntry::new("service-b", "Foreign", "x", "string");
        let payload = serde_json::to_string(&foreign).unwrap();
        let client = redis::Client::open(url.as_str()).unwrap();
        let mut conn = client.get_connection().unwrap();
        let _: () = redis::cmd("PUBLISH")
            .arg("configchange:service-a")
            .arg(&payload)
            .query(&mut conn)
            .unwrap();

        thread::sleep(Duration::from_millis(500));
        assert_eq!(received.lock().unwrap().len(), 1);

        subscriber.stop_listening().unwrap();
    }

    #[test]
    fn test_channel_rejects_second_subscription() {
        let Some((_container, url)) = setup_redis() else {
            return;
        };

        let channel = RedisChannel::connect(&url).unwrap();
        channel
            .subscribe("service-a", Arc::new(|_entry| {}))
            .unwrap();
        assert!(channel
            .subscribe("service-a", Arc::new(|_entry| {}))
            .is_err());

        // Stopping releases the slot; a fresh subscription succeeds.
        channel.stop_listening().unwrap();
        channel.stop_listening().unwrap();
        channel
            .subscribe("service-a", Arc::new(|_entry| {}))
            .unwrap();
        channel.stop_listening().unwrap();
    }
}

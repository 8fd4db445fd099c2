// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for container-backed integration tests.

use std::sync::OnceLock;

/// Returns whether a usable Docker daemon is reachable.
///
/// The probe runs once per test binary and is cached.
#[allow(dead_code)]
pub fn docker_available() -> bool {
    static PROBE: OnceLock<bool> = OnceLock::new();
    *PROBE.get_or_init(|| {
        std::process::Command::new("docker")
            .arg("info")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    })
}

/// Announces a skipped container-backed test on stderr.
#[allow(dead_code)]
pub fn announce_skip(test_name: &str) {
    eprintln!("skipping {}: no Docker daemon reachable", test_name);
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the configuration reader.
//!
//! This module contains the orchestrator that ties the ports together:
//! cache-aside typed reads, store-first writes, the pull-refresh loop, and
//! change-notification ingestion.

pub mod reader;

pub use reader::{ConfigReader, ConfigReaderBuilder};

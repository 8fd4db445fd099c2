// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration entry record and value type tags.
//!
//! This module provides `ConfigurationEntry`, the unit of configuration that
//! flows between the store, the cache, and the change channel, and
//! `ValueKind`, the parsed form of an entry's declared value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key/value configuration record.
///
/// The value is always stored as raw text; the semantic type is carried
/// out-of-band in `value_type` and applied at read time (see
/// [`FromEntryValue`](crate::domain::FromEntryValue)). An entry belongs to
/// exactly one application namespace, within which its `name` is unique.
///
/// # Examples
///
/// ```
/// use dynconf::domain::ConfigurationEntry;
///
/// let entry = ConfigurationEntry::new("service-a", "SiteName", "soty.io", "string");
/// assert_eq!(entry.application_name, "service-a");
/// assert!(entry.is_active);
/// assert!(entry.id.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    /// Opaque unique identifier, assigned by the store on first insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The application namespace this entry belongs to.
    pub application_name: String,
    /// The configuration key, unique within the application namespace.
    pub name: String,
    /// Raw textual payload.
    pub value: String,
    /// Declared value type tag (`string`, `int`, `bool`, `double`,
    /// case-insensitive). Unknown tags are tolerated and read as strings.
    pub value_type: String,
    /// Soft-delete flag. Inactive entries yield no value to typed readers.
    pub is_active: bool,
    /// Creation timestamp, immutable after the first insert.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp; drives incremental refresh.
    pub updated_at: DateTime<Utc>,
}

impl ConfigurationEntry {
    /// Creates a new active entry with no id and both timestamps set to now.
    ///
    /// The store assigns the id and restamps the timestamps on insert.
    pub fn new(
        application_name: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            application_name: application_name.into(),
            name: name.into(),
            value: value.into(),
            value_type: value_type.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parses the declared `value_type` tag into a [`ValueKind`].
    pub fn kind(&self) -> ValueKind {
        ValueKind::parse(&self.value_type)
    }
}

impl fmt::Display for ConfigurationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.application_name, self.name)
    }
}

/// The parsed form of an entry's declared value type tag.
///
/// Tags are matched case-insensitively; anything that is not `int`, `bool`,
/// or `double` falls back to [`ValueKind::Str`], so unknown tags behave as
/// plain strings at read time.
///
/// # Examples
///
/// ```
/// use dynconf::domain::ValueKind;
///
/// assert_eq!(ValueKind::parse("Int"), ValueKind::Int);
/// assert_eq!(ValueKind::parse("DOUBLE"), ValueKind::Double);
/// assert_eq!(ValueKind::parse("timestamp"), ValueKind::Str);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Plain text; identity conversion.
    Str,
    /// Integer parse.
    Int,
    /// Boolean parse.
    Bool,
    /// Floating-point parse.
    Double,
}

impl ValueKind {
    /// Parses a raw type tag, case-insensitively. Unknown tags map to `Str`.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "int" => ValueKind::Int,
            "bool" => ValueKind::Bool,
            "double" => ValueKind::Double,
            _ => ValueKind::Str,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
            ValueKind::Double => "double",
        };
        write!(f, "{}", tag)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Tracked domains keyed by domain name. Ordered so that saving is deterministic.
pub type DomainSet = BTreeMap<String, DomainRecord>;

/// One tracked domain and the store version last written to disk for it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DomainRecord {
    /// Filled from the map key after loading
    #[serde(skip)]
    pub domain: String,
    #[serde(default = "default_mount")]
    pub mount: String,
    #[serde(default)]
    pub path: String,
    #[serde(
        default,
        deserialize_with = "lenient_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<u64>,
    /// Keys we don't interpret, written back as found
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DomainRecord {
    pub fn new(domain: &str, mount: &str, path: &str) -> Self {
        Self {
            domain: domain.to_string(),
            mount: mount.to_string(),
            path: path.to_string(),
            version: None,
            extra: Map::new(),
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// `mount/path` as used in log lines
    pub fn location(&self) -> String {
        format!("{}/{}", self.mount, self.path)
    }
}

fn default_mount() -> String {
    defaults::MOUNT.to_string()
}

/// Accept integers and numeric strings; anything else means "never synced"
fn lenient_version<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_version))
}

/// Interpret a stored version value. Only positive integers are versions.
pub fn parse_version(value: &Value) -> Option<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.filter(|v| *v > 0)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain → store path resolution for uploads

use crate::constants::defaults;
use crate::error::{StoreError, StoreResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read-only lookup table from domain to `mount/path`
#[derive(Debug, Clone)]
pub struct PathMapping {
    entries: HashMap<String, String>,
    /// Domains listed with a value that is not a usable path, with the reason
    invalid: HashMap<String, String>,
    default_path: String,
}

impl PathMapping {
    pub fn new(entries: HashMap<String, String>, default_path: impl Into<String>) -> Self {
        Self {
            entries,
            invalid: HashMap::new(),
            default_path: default_path.into(),
        }
    }

    /// Load the mapping file. Any read or parse failure yields an empty
    /// mapping, so every domain falls back to the default path.
    pub fn load(file: &Path, default_path: impl Into<String>) -> Self {
        let default_path = default_path.into();
        let raw = match fs::read_to_string(file) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Failed to read path mapping {}, using default path {}: {}",
                    file.display(),
                    default_path,
                    e
                );
                return Self::new(HashMap::new(), default_path);
            }
        };

        let parsed: HashMap<String, Value> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    "Failed to parse path mapping {}, using default path {}: {}",
                    file.display(),
                    default_path,
                    e
                );
                return Self::new(HashMap::new(), default_path);
            }
        };

        let mut mapping = Self::new(HashMap::new(), default_path);
        for (domain, value) in parsed {
            match mapped_path(&value) {
                Some(path) => {
                    mapping.entries.insert(domain, path);
                }
                None => {
                    warn!(
                        "Path mapping for {} is not a usable store path: {}",
                        domain, value
                    );
                    mapping.invalid.insert(domain, value.to_string());
                }
            }
        }
        mapping
    }

    /// Store path for `domain`, or the default path when it is not mapped.
    /// A domain listed with an unusable value is an error, never the default.
    pub fn resolve(&self, domain: &str) -> StoreResult<&str> {
        if let Some(path) = self.entries.get(domain) {
            return Ok(path.as_str());
        }
        if let Some(value) = self.invalid.get(domain) {
            return Err(StoreError::InvalidRequest(format!(
                "path mapping for {} is not a store path: {}",
                domain, value
            )));
        }
        debug!("No path mapping for {}, using default", domain);
        Ok(self.default_path.as_str())
    }
}

/// A plain `"mount/path"` string, or a domain-list record `{"mount", "path"}`
fn mapped_path(value: &Value) -> Option<String> {
    match value {
        Value::String(path) => Some(path.clone()),
        Value::Object(record) => {
            let mount = match record.get("mount") {
                Some(Value::String(mount)) => mount.as_str(),
                None => defaults::MOUNT,
                Some(_) => return None,
            };
            match record.get("path") {
                Some(Value::String(path)) if !path.trim_matches('/').is_empty() => {
                    Some(format!("{}/{}", mount, path.trim_start_matches('/')))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// A resolved store location split into mount point and secret path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePath {
    pub mount: String,
    pub path: String,
}

impl StorePath {
    /// Split `mount/rest` at the first separator
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let trimmed = raw.trim().trim_start_matches('/');
        let Some((mount, rest)) = trimmed.split_once('/') else {
            return Err(StoreError::InvalidRequest(format!(
                "store path '{}' has no mount point",
                raw
            )));
        };

        let path = rest.trim_start_matches('/');
        if mount.is_empty() || path.is_empty() {
            return Err(StoreError::InvalidRequest(format!(
                "store path '{}' must be <mount>/<path>",
                raw
            )));
        }

        Ok(Self {
            mount: mount.to_string(),
            path: path.to_string(),
        })
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mount, self.path)
    }
}

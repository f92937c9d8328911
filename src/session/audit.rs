// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Unseal key shares and the append-only unseal audit log

use crate::error::{CertSyncError, Result};
use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read the ordered key shares from a JSON array of strings
pub fn load_unseal_keys(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|e| CertSyncError::local_io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Text log with one timestamped line per unseal event
#[derive(Debug, Clone)]
pub struct UnsealAuditLog {
    path: PathBuf,
}

impl UnsealAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CertSyncError::local_io(&self.path, e))?;

        let line = format!(
            "{} {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            message
        );
        file.write_all(line.as_bytes())
            .map_err(|e| CertSyncError::local_io(&self.path, e))
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Durable domain → version mapping backed by a JSON file.

use crate::error::{CertSyncError, Result};
use crate::types::DomainSet;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the domain set. A missing or corrupt file is treated as a first run.
    pub fn load(&self) -> DomainSet {
        match self.try_load() {
            Ok(set) => {
                debug!("Loaded {} domains from {}", set.len(), self.path.display());
                set
            }
            Err(e) => {
                error!(
                    "Failed to read domain list {}, starting empty: {}",
                    self.path.display(),
                    e
                );
                DomainSet::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<DomainSet> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| CertSyncError::local_io(&self.path, e))?;
        let mut set: DomainSet = serde_json::from_str(&raw)?;
        for (domain, record) in set.iter_mut() {
            record.domain = domain.clone();
        }
        Ok(set)
    }

    /// Replace the file with the full domain set.
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the target so
    /// that a crash leaves either the old or the new contents.
    #[instrument(skip(self, set), fields(file = %self.path.display(), domains = set.len()))]
    pub fn save(&self, set: &DomainSet) -> Result<()> {
        let bytes = to_pretty_json(set)?;
        let tmp = self.temp_path();

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(CertSyncError::local_io(&tmp, e));
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CertSyncError::local_io(&self.path, e)
        })?;

        info!("Saved {} domains to {}", set.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "domains.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Serialize with four-space indentation to match hand-edited files
fn to_pretty_json(set: &DomainSet) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    set.serialize(&mut ser)?;
    Ok(out)
}

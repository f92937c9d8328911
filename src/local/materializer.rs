// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Writes and reads certificate material on the local filesystem

use crate::config::Config;
use crate::error::{CertSyncError, Result};
use crate::types::SecretPayload;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lays certificate material out as `<output_dir>/<domain>/{cert,key,ca}`
#[derive(Debug, Clone)]
pub struct LocalMaterializer {
    output_dir: PathBuf,
    cert_name: String,
    key_name: String,
    ca_name: String,
}

impl LocalMaterializer {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        cert_name: impl Into<String>,
        key_name: impl Into<String>,
        ca_name: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            cert_name: cert_name.into(),
            key_name: key_name.into(),
            ca_name: ca_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.output_dir,
            &config.cert_name,
            &config.key_name,
            &config.ca_name,
        )
    }

    pub fn domain_dir(&self, domain: &str) -> Result<PathBuf> {
        validate_domain(domain)?;
        Ok(self.output_dir.join(domain))
    }

    /// Write the payload for `domain`, replacing any existing files.
    /// Returns the domain directory.
    pub fn write(&self, domain: &str, payload: &SecretPayload) -> Result<PathBuf> {
        let dir = self.domain_dir(domain)?;
        fs::create_dir_all(&dir).map_err(|e| CertSyncError::local_io(&dir, e))?;

        write_file(&dir.join(&self.cert_name), &payload.cert, false)?;
        write_file(&dir.join(&self.key_name), &payload.key, true)?;
        write_file(&dir.join(&self.ca_name), &payload.ca, false)?;

        debug!("Wrote certificate material for {} to {}", domain, dir.display());
        Ok(dir)
    }

    /// Read local material for an upload. The CA chain is optional: a missing
    /// or unreadable chain becomes an empty string.
    pub fn read(
        cert_path: &Path,
        key_path: &Path,
        ca_path: Option<&Path>,
    ) -> Result<SecretPayload> {
        let cert =
            fs::read_to_string(cert_path).map_err(|e| CertSyncError::local_io(cert_path, e))?;
        let key = fs::read_to_string(key_path).map_err(|e| CertSyncError::local_io(key_path, e))?;

        let ca = match ca_path {
            Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
                warn!(
                    "Failed to read CA chain {}, uploading without it: {}",
                    path.display(),
                    e
                );
                String::new()
            }),
            None => String::new(),
        };

        Ok(SecretPayload::new(cert, key, ca))
    }
}

/// Domains become directory names, so they must be a single plain component
fn validate_domain(domain: &str) -> Result<()> {
    let invalid = domain.is_empty()
        || domain == "."
        || domain == ".."
        || domain.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CertSyncError::InvalidDomain(domain.to_string()));
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str, private: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options
        .open(path)
        .map_err(|e| CertSyncError::local_io(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| CertSyncError::local_io(path, e))
}

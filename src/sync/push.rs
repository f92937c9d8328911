// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Push workflow: upload one locally issued certificate

use crate::constants::ECC_TRUTHY;
use crate::error::Result;
use crate::local::{LocalMaterializer, PathMapping, StorePath};
use crate::sync::SyncEngine;
use std::path::PathBuf;
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct PushRequest {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    pub domain: String,
    pub is_ecc: bool,
    pub ca_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub mount: String,
    pub path: String,
    pub version: u64,
}

/// Case-insensitive match against the accepted ECC tokens
pub fn parse_ecc_flag(raw: &str) -> bool {
    let raw = raw.trim();
    ECC_TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(raw))
}

impl SyncEngine {
    /// Upload the certificate described by `request` as a new store version.
    /// The version file is left untouched.
    #[instrument(skip(self, request, paths), fields(domain = %request.domain))]
    pub async fn push(&self, request: &PushRequest, paths: &PathMapping) -> Result<PushOutcome> {
        self.guardian.ensure_ready().await;

        let mut payload = LocalMaterializer::read(
            &request.cert_file,
            &request.key_file,
            request.ca_file.as_deref(),
        )?;
        payload.is_ecc = request.is_ecc;

        let target = StorePath::parse(paths.resolve(&request.domain)?)?;
        info!("Uploading certificate for {} to {}", request.domain, target);

        let version = self
            .client
            .write_version(&target.mount, &target.path, &payload)
            .await
            .map_err(|e| {
                error!(
                    "Failed to upload {} to {} ({}): {}",
                    request.domain,
                    target,
                    e.category(),
                    e
                );
                e
            })?;

        info!(
            "Uploaded certificate for {} to {} as version {}",
            request.domain, target, version
        );
        Ok(PushOutcome {
            mount: target.mount,
            path: target.path,
            version,
        })
    }
}

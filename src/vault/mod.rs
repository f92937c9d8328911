// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secrets store access: the [`SecretsClient`] seam and its Vault HTTP implementation.

pub mod client;
pub mod models;
pub mod transport;

pub use client::VaultClient;
pub use transport::{HttpService, ReqwestTransport};

use crate::error::StoreResult;
use crate::types::{SecretPayload, TokenInfo};
use async_trait::async_trait;
use std::time::Duration;

/// Operations the sync workflows need from the secrets store
#[async_trait]
pub trait SecretsClient: Send + Sync {
    /// Current version number of the secret at `mount/path`
    async fn current_version(&self, mount: &str, path: &str) -> StoreResult<u64>;

    /// Data of one specific version. Deleted or destroyed versions are an error.
    async fn fetch_version(&self, mount: &str, path: &str, version: u64)
        -> StoreResult<SecretPayload>;

    /// Data of the current version together with its version number
    async fn fetch_latest(&self, mount: &str, path: &str) -> StoreResult<(SecretPayload, u64)>;

    /// Create a new version of the secret, returning its version number
    async fn write_version(
        &self,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> StoreResult<u64>;

    async fn is_sealed(&self) -> StoreResult<bool>;

    /// Submit key shares in order. Returns the resulting sealed state.
    async fn submit_unseal_keys(&self, keys: &[String]) -> StoreResult<bool>;

    async fn lookup_self_token(&self) -> StoreResult<TokenInfo>;

    async fn renew_self_token(&self, increment: Duration) -> StoreResult<()>;
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the Vault HTTP API.

use crate::types::SecretPayload;
use serde::{Deserialize, Serialize};

/// Most responses wrap their body in a `data` object
#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    pub data: T,
}

/// `GET /v1/{mount}/metadata/{path}`
#[derive(Deserialize, Debug)]
pub struct KvMetadata {
    pub current_version: u64,
}

/// `GET /v1/{mount}/data/{path}`
#[derive(Deserialize, Debug)]
pub struct KvVersion {
    pub data: Option<SecretPayload>,
    pub metadata: KvVersionMetadata,
}

#[derive(Deserialize, Debug)]
pub struct KvVersionMetadata {
    pub version: u64,
    #[serde(default)]
    pub deletion_time: String,
    #[serde(default)]
    pub destroyed: bool,
}

impl KvVersionMetadata {
    pub fn is_deleted(&self) -> bool {
        self.destroyed || !self.deletion_time.is_empty()
    }
}

/// `POST /v1/{mount}/data/{path}` request body
#[derive(Serialize, Debug)]
pub struct KvWriteRequest<'a> {
    pub data: &'a SecretPayload,
}

/// `POST /v1/{mount}/data/{path}` response
#[derive(Deserialize, Debug)]
pub struct KvWriteResult {
    pub version: u64,
}

/// `GET /v1/sys/seal-status` and `PUT /v1/sys/unseal`
#[derive(Deserialize, Debug)]
pub struct SealStatus {
    pub sealed: bool,
}

#[derive(Serialize, Debug)]
pub struct UnsealRequest<'a> {
    pub key: &'a str,
}

/// `GET /v1/auth/token/lookup-self`
#[derive(Deserialize, Debug)]
pub struct TokenLookup {
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(default)]
    pub renewable: bool,
}

#[derive(Serialize, Debug)]
pub struct RenewRequest {
    pub increment: String,
}

/// Error body returned with non-2xx statuses
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

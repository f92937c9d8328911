// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a secrets store operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no secret found: {0}")]
    NotFound(String),

    #[error("version {version} has been deleted")]
    DeletedVersion { version: u64 },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("store is sealed")]
    Sealed,

    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// Short label used in log lines to group failures.
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::PermissionDenied(_) | StoreError::Unauthenticated(_) => "auth",
            StoreError::InvalidRequest(_) | StoreError::NotFound(_) => "request",
            StoreError::DeletedVersion { .. } | StoreError::UnexpectedResponse(_) => "data",
            StoreError::Sealed | StoreError::Transport(_) => "transport",
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum CertSyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("local I/O error on {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid domain name: {0:?}")]
    InvalidDomain(String),
}

impl CertSyncError {
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CertSyncError::LocalIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CertSyncError>;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, env as keys, TOKEN_RENEWAL_INCREMENT_SECS};
use crate::error::{CertSyncError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub vault_url: Url,
    pub vault_token: String,
    /// Domain list with last-synced versions, rewritten after every fetch run
    pub paths_file: PathBuf,
    /// Domain to store path mapping consulted by push
    pub path_map_file: PathBuf,
    pub default_vault_path: String,
    pub unseal_keys_file: PathBuf,
    pub unseal_logs_file: PathBuf,
    pub output_dir: PathBuf,
    pub cert_name: String,
    pub key_name: String,
    pub ca_name: String,
    pub check_interval: Duration,
    pub token_renewal_threshold: Duration,
    pub token_renewal_increment: Duration,
    pub vault_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                CertSyncError::Config(format!("{} environment variable not set", key))
            })
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match get(key) {
                Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    CertSyncError::Config(format!("{} must be a number of seconds: {}", key, e))
                }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let raw_url = required(keys::VAULT_URL)?;
        let vault_url = Url::parse(raw_url.trim()).map_err(|e| {
            CertSyncError::Config(format!("{} is not a valid URL: {}", keys::VAULT_URL, e))
        })?;
        let vault_token = required(keys::VAULT_TOKEN)?;

        let paths_file = PathBuf::from(
            get(keys::VAULT_PATHS_FILE).unwrap_or_else(|| defaults::PATHS_FILE.to_string()),
        );
        let path_map_file = get(keys::VAULT_PATH_MAP_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| paths_file.clone());

        Ok(Config {
            vault_url,
            vault_token,
            paths_file,
            path_map_file,
            default_vault_path: get(keys::DEFAULT_VAULT_PATH)
                .unwrap_or_else(|| defaults::VAULT_PATH.to_string()),
            unseal_keys_file: PathBuf::from(
                get(keys::UNSEAL_KEYS_FILE)
                    .unwrap_or_else(|| defaults::UNSEAL_KEYS_FILE.to_string()),
            ),
            unseal_logs_file: PathBuf::from(
                get(keys::UNSEAL_LOGS_FILE)
                    .unwrap_or_else(|| defaults::UNSEAL_LOGS_FILE.to_string()),
            ),
            output_dir: PathBuf::from(
                get(keys::OUTPUT_DIR).unwrap_or_else(|| defaults::OUTPUT_DIR.to_string()),
            ),
            cert_name: get(keys::CERT_NAME).unwrap_or_else(|| defaults::CERT_NAME.to_string()),
            key_name: get(keys::KEY_NAME).unwrap_or_else(|| defaults::KEY_NAME.to_string()),
            ca_name: get(keys::CA_NAME).unwrap_or_else(|| defaults::CA_NAME.to_string()),
            check_interval: seconds(keys::CHECK_INTERVAL, defaults::CHECK_INTERVAL_SECS)?,
            token_renewal_threshold: seconds(
                keys::TOKEN_RENEWAL_THRESHOLD,
                defaults::TOKEN_RENEWAL_THRESHOLD_SECS,
            )?,
            token_renewal_increment: Duration::from_secs(TOKEN_RENEWAL_INCREMENT_SECS),
            vault_timeout: seconds(keys::VAULT_TIMEOUT, defaults::VAULT_TIMEOUT_SECS)?,
            log_file: get(keys::LOG_FILE).map(PathBuf::from),
        })
    }
}

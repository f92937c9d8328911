// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variable names read by [`crate::config::Config`]
pub mod env {
    pub const VAULT_URL: &str = "VAULT_URL";
    pub const VAULT_TOKEN: &str = "VAULT_TOKEN";
    pub const VAULT_PATHS_FILE: &str = "VAULT_PATHS_FILE";
    pub const VAULT_PATH_MAP_FILE: &str = "VAULT_PATH_MAP_FILE";
    pub const DEFAULT_VAULT_PATH: &str = "DEFAULT_VAULT_PATH";
    pub const UNSEAL_KEYS_FILE: &str = "UNSEAL_KEYS_FILE";
    pub const UNSEAL_LOGS_FILE: &str = "UNSEAL_LOGS_FILE";
    pub const OUTPUT_DIR: &str = "OUTPUT_DIR";
    pub const CERT_NAME: &str = "CERT_NAME";
    pub const KEY_NAME: &str = "KEY_NAME";
    pub const CA_NAME: &str = "CA_NAME";
    pub const CHECK_INTERVAL: &str = "CHECK_INTERVAL";
    pub const TOKEN_RENEWAL_THRESHOLD: &str = "TOKEN_RENEWAL_THRESHOLD";
    pub const VAULT_TIMEOUT: &str = "VAULT_TIMEOUT";
    pub const LOG_FILE: &str = "LOG_FILE";
    /// Tracing filter directive, e.g. `certsync=debug`
    pub const LOG_FILTER: &str = "CERTSYNC_LOG";
}

/// Defaults applied when a variable is unset
pub mod defaults {
    pub const PATHS_FILE: &str = "./vault_paths.json";
    pub const VAULT_PATH: &str = "ssl/data/default";
    pub const UNSEAL_KEYS_FILE: &str = "./vault_unseal_keys.json";
    pub const UNSEAL_LOGS_FILE: &str = "./vault_unseal.log";
    pub const OUTPUT_DIR: &str = "./certs";
    pub const CERT_NAME: &str = "cert.pem";
    pub const KEY_NAME: &str = "key.pem";
    pub const CA_NAME: &str = "ca.pem";
    /// One week
    pub const CHECK_INTERVAL_SECS: u64 = 604_800;
    /// One week
    pub const TOKEN_RENEWAL_THRESHOLD_SECS: u64 = 604_800;
    pub const VAULT_TIMEOUT_SECS: u64 = 30;
    /// Mount point used when a domain record omits `mount`
    pub const MOUNT: &str = "ssl";
}

/// Token self-renewal increment: 32 days
pub const TOKEN_RENEWAL_INCREMENT_SECS: u64 = 32 * 24 * 60 * 60;

/// Header carrying the store token on every request
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Tokens accepted as "true" for the push ECC flag (compared case-insensitively)
pub const ECC_TRUTHY: [&str; 5] = ["true", "yes", "1", "--ecc", "-ecc"];

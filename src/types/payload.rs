// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::ECC_TRUTHY;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Certificate material stored under one secret version.
///
/// The contents are never parsed; PEM text goes in and out unchanged.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SecretPayload {
    #[serde(default)]
    pub cert: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub ca: String,
    /// Secrets written by hand store every value as a string
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_ecc: bool,
}

impl SecretPayload {
    pub fn new(cert: impl Into<String>, key: impl Into<String>, ca: impl Into<String>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
            ca: ca.into(),
            is_ecc: false,
        }
    }
}

/// Accept a bool, a truthy token or `1`; anything else is false
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => {
            let s = s.trim();
            ECC_TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(s))
        }
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    })
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("cert_len", &self.cert.len())
            .field("key", &"<redacted>")
            .field("ca_len", &self.ca.len())
            .field("is_ecc", &self.is_ecc)
            .finish()
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, Utc};

/// Result of a token self-lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    /// `None` for tokens without a TTL (e.g. root tokens)
    pub expire_time: Option<DateTime<Utc>>,
    pub renewable: bool,
}

/// Store session state observed during one run. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub sealed: Option<bool>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub renewable: Option<bool>,
}

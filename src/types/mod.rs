// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Data model shared by the store client and the sync workflows.

pub mod payload;
pub mod record;
pub mod session;

pub use payload::SecretPayload;
pub use record::{DomainRecord, DomainSet};
pub use session::{SessionState, TokenInfo};

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Store session liveness: seal detection, unsealing and token renewal.

pub mod audit;
pub mod guardian;

pub use audit::{load_unseal_keys, UnsealAuditLog};
pub use guardian::{SealOutcome, SessionGuardian, SessionReport, TokenOutcome};

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Certificate synchronization workflows.
//!
//! [`SyncEngine::pull`] downloads changed certificates for every tracked domain,
//! [`SyncEngine::push`] uploads one local certificate. Both run the
//! [`SessionGuardian`] first.

pub mod pull;
pub mod push;

pub use pull::{DomainOutcome, PullReport};
pub use push::{parse_ecc_flag, PushOutcome, PushRequest};

use crate::config::Config;
use crate::local::LocalMaterializer;
use crate::session::SessionGuardian;
use crate::vault::SecretsClient;
use std::sync::Arc;

pub struct SyncEngine {
    client: Arc<dyn SecretsClient>,
    guardian: SessionGuardian,
    materializer: LocalMaterializer,
}

impl SyncEngine {
    pub fn new(
        client: Arc<dyn SecretsClient>,
        guardian: SessionGuardian,
        materializer: LocalMaterializer,
    ) -> Self {
        Self {
            client,
            guardian,
            materializer,
        }
    }

    pub fn from_config(client: Arc<dyn SecretsClient>, config: &Config) -> Self {
        let guardian = SessionGuardian::from_config(client.clone(), config);
        Self::new(client, guardian, LocalMaterializer::from_config(config))
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Best-effort session checks run before every workflow.
//!
//! Neither check can abort a run: failures are logged and reported in the
//! [`SessionReport`], and the data operations that follow fail on their own
//! if the store is really unusable.

use crate::config::Config;
use crate::error::Result;
use crate::session::audit::{load_unseal_keys, UnsealAuditLog};
use crate::types::SessionState;
use crate::vault::SecretsClient;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealOutcome {
    AlreadyUnsealed,
    Unsealed,
    StillSealed,
    UnsealFailed(String),
    /// Seal status could not be queried
    CheckFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// Token has no TTL
    NoExpiry,
    Valid { remaining_secs: i64 },
    Renewed { remaining_secs: i64 },
    NotRenewable { remaining_secs: i64 },
    RenewFailed(String),
    CheckFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub seal: SealOutcome,
    pub token: TokenOutcome,
    pub state: SessionState,
}

pub struct SessionGuardian {
    client: Arc<dyn SecretsClient>,
    unseal_keys_file: PathBuf,
    audit: UnsealAuditLog,
    renewal_threshold: Duration,
    renewal_increment: Duration,
}

impl SessionGuardian {
    pub fn new(
        client: Arc<dyn SecretsClient>,
        unseal_keys_file: impl Into<PathBuf>,
        audit: UnsealAuditLog,
        renewal_threshold: Duration,
        renewal_increment: Duration,
    ) -> Self {
        Self {
            client,
            unseal_keys_file: unseal_keys_file.into(),
            audit,
            renewal_threshold,
            renewal_increment,
        }
    }

    pub fn from_config(client: Arc<dyn SecretsClient>, config: &Config) -> Self {
        Self::new(
            client,
            &config.unseal_keys_file,
            UnsealAuditLog::new(&config.unseal_logs_file),
            config.token_renewal_threshold,
            config.token_renewal_increment,
        )
    }

    /// Run the seal check, then the token check. Never fails.
    #[instrument(skip(self))]
    pub async fn ensure_ready(&self) -> SessionReport {
        let mut state = SessionState::default();
        let seal = self.check_seal(&mut state).await;
        let token = self.check_token_at(Utc::now(), &mut state).await;
        SessionReport { seal, token, state }
    }

    async fn check_seal(&self, state: &mut SessionState) -> SealOutcome {
        let sealed = match self.client.is_sealed().await {
            Ok(sealed) => sealed,
            Err(e) => {
                error!("Failed to query seal status ({}): {}", e.category(), e);
                return SealOutcome::CheckFailed(e.to_string());
            }
        };
        state.sealed = Some(sealed);

        if !sealed {
            info!("Store is unsealed");
            return SealOutcome::AlreadyUnsealed;
        }

        warn!("Store is sealed, attempting unseal");
        self.audit_event("store sealed, attempting unseal");

        let outcome = match self.unseal().await {
            Ok(false) => {
                info!("Store unsealed successfully");
                self.audit_event("unseal succeeded, store is unsealed");
                SealOutcome::Unsealed
            }
            Ok(true) => {
                error!("Store is still sealed after submitting key shares");
                self.audit_event("unseal attempted, store is still sealed");
                SealOutcome::StillSealed
            }
            Err(e) => {
                error!("Unseal attempt failed: {}", e);
                self.audit_event(&format!("unseal failed: {}", e));
                SealOutcome::UnsealFailed(e.to_string())
            }
        };

        state.sealed = match outcome {
            SealOutcome::Unsealed => Some(false),
            SealOutcome::StillSealed => Some(true),
            _ => state.sealed,
        };
        outcome
    }

    /// Submit key shares and re-check. Returns the sealed state afterwards.
    async fn unseal(&self) -> Result<bool> {
        let keys = load_unseal_keys(&self.unseal_keys_file)?;
        info!(
            "Submitting {} unseal key shares from {}",
            keys.len(),
            self.unseal_keys_file.display()
        );
        self.client.submit_unseal_keys(&keys).await?;
        Ok(self.client.is_sealed().await?)
    }

    fn audit_event(&self, message: &str) {
        if let Err(e) = self.audit.append(message) {
            warn!(
                "Failed to write unseal audit log {}: {}",
                self.audit.path().display(),
                e
            );
        }
    }

    /// Token check against an explicit clock
    pub async fn check_token_at(
        &self,
        now: DateTime<Utc>,
        state: &mut SessionState,
    ) -> TokenOutcome {
        let token = match self.client.lookup_self_token().await {
            Ok(token) => token,
            Err(e) => {
                error!("Failed to look up token ({}): {}", e.category(), e);
                return TokenOutcome::CheckFailed(e.to_string());
            }
        };
        state.token_expiry = token.expire_time;
        state.renewable = Some(token.renewable);

        let Some(expire_time) = token.expire_time else {
            info!("Token has no expiry, no renewal needed");
            return TokenOutcome::NoExpiry;
        };

        let remaining_secs = (expire_time - now).num_seconds();
        let threshold_secs = i64::try_from(self.renewal_threshold.as_secs()).unwrap_or(i64::MAX);
        if remaining_secs >= threshold_secs {
            info!("Token valid for {}s, no renewal needed", remaining_secs);
            return TokenOutcome::Valid { remaining_secs };
        }

        if !token.renewable {
            warn!(
                "Token expires in {}s and is not renewable, manual intervention required",
                remaining_secs
            );
            return TokenOutcome::NotRenewable { remaining_secs };
        }

        match self.client.renew_self_token(self.renewal_increment).await {
            Ok(()) => {
                info!(
                    "Token renewed by {}s (had {}s left)",
                    self.renewal_increment.as_secs(),
                    remaining_secs
                );
                TokenOutcome::Renewed { remaining_secs }
            }
            Err(e) => {
                error!("Token renewal failed ({}): {}", e.category(), e);
                TokenOutcome::RenewFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::test_utils::FakeSecretsClient;
    use crate::types::TokenInfo;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    const DAY: u64 = 24 * 60 * 60;

    struct Fixture {
        dir: TempDir,
        client: FakeSecretsClient,
        guardian: SessionGuardian,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let keys_file = dir.path().join("unseal_keys.json");
            fs::write(&keys_file, r#"["share-1", "share-2", "share-3"]"#).unwrap();

            let client = FakeSecretsClient::new();
            let guardian = SessionGuardian::new(
                Arc::new(client.clone()),
                keys_file,
                UnsealAuditLog::new(dir.path().join("unseal.log")),
                Duration::from_secs(7 * DAY),
                Duration::from_secs(32 * DAY),
            );
            Self {
                dir,
                client,
                guardian,
            }
        }

        fn audit_lines(&self) -> Vec<String> {
            fs::read_to_string(self.dir.path().join("unseal.log"))
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn expiring_in(days: i64, renewable: bool) -> TokenInfo {
        TokenInfo {
            expire_time: Some(now() + chrono::Duration::days(days)),
            renewable,
        }
    }

    #[tokio::test]
    async fn test_unsealed_store_is_left_alone() {
        let fx = Fixture::new();

        let report = fx.guardian.ensure_ready().await;

        assert_eq!(report.seal, SealOutcome::AlreadyUnsealed);
        assert_eq!(report.state.sealed, Some(false));
        assert!(fx.client.submitted_keys().is_empty());
        assert!(fx.audit_lines().is_empty());
    }

    #[tokio::test]
    async fn test_sealed_store_is_unsealed_and_audited() {
        let fx = Fixture::new();
        fx.client.set_sealed(true, true);

        let report = fx.guardian.ensure_ready().await;

        assert_eq!(report.seal, SealOutcome::Unsealed);
        assert_eq!(report.state.sealed, Some(false));
        assert_eq!(
            fx.client.submitted_keys(),
            vec!["share-1", "share-2", "share-3"]
        );
        let lines = fx.audit_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("attempting unseal"));
        assert!(lines[1].contains("unseal succeeded"));
    }

    #[tokio::test]
    async fn test_still_sealed_is_not_fatal() {
        let fx = Fixture::new();
        fx.client.set_sealed(true, false);
        fx.client.set_token(TokenInfo {
            expire_time: Some(Utc::now() + chrono::Duration::days(1)),
            renewable: true,
        });

        let report = fx.guardian.ensure_ready().await;

        assert_eq!(report.seal, SealOutcome::StillSealed);
        // token check still ran
        assert!(matches!(report.token, TokenOutcome::Renewed { .. }));
        assert!(fx.audit_lines()[1].contains("still sealed"));
    }

    #[tokio::test]
    async fn test_missing_key_file_is_audited() {
        let fx = Fixture::new();
        fs::remove_file(fx.dir.path().join("unseal_keys.json")).unwrap();
        fx.client.set_sealed(true, true);

        let report = fx.guardian.ensure_ready().await;

        assert!(matches!(report.seal, SealOutcome::UnsealFailed(_)));
        assert!(fx.client.submitted_keys().is_empty());
        let lines = fx.audit_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("unseal failed"));
    }

    #[tokio::test]
    async fn test_seal_status_error_is_not_fatal() {
        let fx = Fixture::new();
        fx.client
            .fail_seal_status(StoreError::Transport("connection refused".into()));
        // ensure_ready reads the real clock
        fx.client.set_token(TokenInfo {
            expire_time: Some(Utc::now() + chrono::Duration::days(30)),
            renewable: true,
        });

        let report = fx.guardian.ensure_ready().await;

        assert!(matches!(report.seal, SealOutcome::CheckFailed(_)));
        assert_eq!(report.state.sealed, None);
        assert!(matches!(report.token, TokenOutcome::Valid { .. }));
    }

    #[tokio::test]
    async fn test_token_renewed_below_threshold() {
        let fx = Fixture::new();
        fx.client.set_token(expiring_in(3, true));
        let mut state = SessionState::default();

        let outcome = fx.guardian.check_token_at(now(), &mut state).await;

        assert_eq!(
            outcome,
            TokenOutcome::Renewed {
                remaining_secs: 3 * DAY as i64
            }
        );
        assert_eq!(fx.client.renewals(), vec![Duration::from_secs(32 * DAY)]);
        assert_eq!(state.renewable, Some(true));
    }

    #[tokio::test]
    async fn test_token_not_renewed_above_threshold() {
        let fx = Fixture::new();
        fx.client.set_token(expiring_in(8, true));
        let mut state = SessionState::default();

        let outcome = fx.guardian.check_token_at(now(), &mut state).await;

        assert!(matches!(outcome, TokenOutcome::Valid { .. }));
        assert!(fx.client.renewals().is_empty());
    }

    #[tokio::test]
    async fn test_non_renewable_token_is_reported() {
        let fx = Fixture::new();
        fx.client.set_token(expiring_in(2, false));
        let mut state = SessionState::default();

        let outcome = fx.guardian.check_token_at(now(), &mut state).await;

        assert!(matches!(outcome, TokenOutcome::NotRenewable { .. }));
        assert!(fx.client.renewals().is_empty());
    }

    #[tokio::test]
    async fn test_token_without_expiry() {
        let fx = Fixture::new();
        fx.client.set_token(TokenInfo {
            expire_time: None,
            renewable: false,
        });
        let mut state = SessionState::default();

        assert_eq!(
            fx.guardian.check_token_at(now(), &mut state).await,
            TokenOutcome::NoExpiry
        );
    }

    #[tokio::test]
    async fn test_token_lookup_error_is_not_fatal() {
        let fx = Fixture::new();
        fx.client
            .fail_token_lookup(StoreError::PermissionDenied("lookup-self".into()));
        let mut state = SessionState::default();

        let outcome = fx.guardian.check_token_at(now(), &mut state).await;

        assert!(matches!(outcome, TokenOutcome::CheckFailed(msg) if msg.contains("lookup-self")));
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pull workflow: fetch changed certificates for every tracked domain

use crate::error::{CertSyncError, Result};
use crate::local::VersionStore;
use crate::session::SessionReport;
use crate::sync::SyncEngine;
use crate::types::{DomainRecord, DomainSet, SecretPayload};
use tracing::{error, info, instrument};

/// What happened to one domain during a pull run
#[derive(Debug)]
pub enum DomainOutcome {
    /// Local copy already matches the store
    Skipped { version: u64 },
    Updated { from: Option<u64>, to: u64 },
    Failed { error: CertSyncError },
}

#[derive(Debug)]
pub struct PullReport {
    pub session: SessionReport,
    /// Outcomes in domain order
    pub outcomes: Vec<(String, DomainOutcome)>,
}

impl PullReport {
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Failed { .. }))
    }

    pub fn outcome(&self, domain: &str) -> Option<&DomainOutcome> {
        self.outcomes
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, o)| o)
    }

    fn count(&self, pred: impl Fn(&DomainOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

impl SyncEngine {
    /// Run one pull over every domain in `versions`, then persist the
    /// updated set once. Only a failure to persist is returned as an error.
    #[instrument(skip(self, versions), fields(file = %versions.path().display()))]
    pub async fn pull(&self, versions: &VersionStore) -> Result<PullReport> {
        let session = self.guardian.ensure_ready().await;

        // An unreadable list is never written back, so a typo cannot wipe it
        let (mut domains, loaded) = match versions.try_load() {
            Ok(domains) => (domains, true),
            Err(e) => {
                error!(
                    "Failed to read domain list {}, nothing to sync and leaving it untouched: {}",
                    versions.path().display(),
                    e
                );
                (DomainSet::new(), false)
            }
        };
        info!("Checking {} domains", domains.len());

        let mut outcomes = Vec::with_capacity(domains.len());
        for (domain, record) in domains.iter_mut() {
            let outcome = match self.sync_domain(record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "Failed to sync {} from {}: {}",
                        domain,
                        record.location(),
                        e
                    );
                    DomainOutcome::Failed { error: e }
                }
            };
            outcomes.push((domain.clone(), outcome));
        }

        if loaded {
            versions.save(&domains)?;
        }

        let report = PullReport { session, outcomes };
        info!(
            "Pull finished: {} updated, {} unchanged, {} failed",
            report.updated(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Bring one domain up to date. The record's version only moves after its
    /// files have been written.
    async fn sync_domain(&self, record: &mut DomainRecord) -> Result<DomainOutcome> {
        let (payload, version) = match record.version {
            Some(local) => {
                let current = self
                    .client
                    .current_version(&record.mount, &record.path)
                    .await?;
                if current == local {
                    info!(
                        "{} is at version {}, skipping download",
                        record.domain, local
                    );
                    return Ok(DomainOutcome::Skipped { version: local });
                }
                let payload = self
                    .client
                    .fetch_version(&record.mount, &record.path, current)
                    .await?;
                (payload, current)
            }
            None => {
                self.client
                    .fetch_latest(&record.mount, &record.path)
                    .await?
            }
        };

        self.materialize(record, &payload, version)
    }

    fn materialize(
        &self,
        record: &mut DomainRecord,
        payload: &SecretPayload,
        version: u64,
    ) -> Result<DomainOutcome> {
        let dir = self.materializer.write(&record.domain, payload)?;
        let from = record.version.replace(version);

        info!(
            "Saved certificate, key and chain for {} (version {}) to {}",
            record.domain,
            version,
            dir.display()
        );
        Ok(DomainOutcome::Updated { from, to: version })
    }
}

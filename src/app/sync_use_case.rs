use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::config::SyncConfig;
use crate::observability::metrics;
use crate::pipeline::normalize::{JobNormalizer, Normalized};
use crate::pipeline::output;
use crate::storage::{FetchOrder, JobStore};
use crate::types::{NormalizedJob, RawJobRecord};

#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub deleted: usize,
    pub fetched: usize,
    pub filtered_out: usize,
    pub missing_link: usize,
    pub prefecture_resolved: usize,
    pub total_jobs: usize,
    pub output_file: String,
    /// Set when an empty fetch left an existing dataset in place
    pub kept_existing: bool,
}

/// Regenerates the dataset from the persistent store: purge stale rows,
/// pull the newest ones, filter and geo-tag them, write the artifact.
pub struct SyncUseCase<'a> {
    store: &'a dyn JobStore,
    normalizer: &'a JobNormalizer,
    config: &'a SyncConfig,
}

impl<'a> SyncUseCase<'a> {
    pub fn new(store: &'a dyn JobStore, normalizer: &'a JobNormalizer, config: &'a SyncConfig) -> Self {
        Self {
            store,
            normalizer,
            config,
        }
    }

    /// Purge, fetch and normalize without touching the file system
    pub async fn collect(&self, report: &mut SyncReport) -> Result<Vec<NormalizedJob>> {
        let threshold = Duration::try_days(self.config.retention_days)
            .and_then(|retention| Utc::now().checked_sub_signed(retention))
            .ok_or_else(|| anyhow!("retention of {} days is out of range", self.config.retention_days))?;
        report.deleted = self.store.delete_older_than(threshold).await;
        metrics::sync::stale_deleted(report.deleted);
        info!("🧹 Deleted {} jobs not updated since {}", report.deleted, threshold);

        let rows = self
            .store
            .fetch_all(FetchOrder::CreatedDesc, self.config.fetch_limit)
            .await;
        report.fetched = rows.len();
        metrics::sync::fetched(rows.len());
        info!("📥 Fetched {} jobs from the store", rows.len());

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            let record = match self.normalizer.normalize(RawJobRecord::from(row)) {
                Normalized::Admitted { record, localized } => {
                    if localized {
                        report.prefecture_resolved += 1;
                    }
                    record
                }
                Normalized::Rejected(_) => {
                    report.filtered_out += 1;
                    continue;
                }
            };
            match NormalizedJob::from_raw(record) {
                Some(job) => jobs.push(job),
                None => report.missing_link += 1,
            }
        }

        report.total_jobs = jobs.len();
        Ok(jobs)
    }

    #[instrument(skip_all, fields(output = %output_file.display()))]
    pub async fn run(&self, output_file: &Path) -> Result<SyncReport> {
        let mut report = SyncReport {
            output_file: output_file.display().to_string(),
            ..Default::default()
        };

        let jobs = self.collect(&mut report).await?;
        if report.fetched == 0 && output_file.exists() {
            // an unreachable store also comes back empty
            warn!(
                "Store returned no jobs, keeping existing {}",
                output_file.display()
            );
            report.kept_existing = true;
            return Ok(report);
        }

        output::write_jobs(output_file, &jobs)
            .with_context(|| format!("writing {}", output_file.display()))?;
        metrics::merge::jobs_written(jobs.len());

        info!(
            "✅ {} jobs valid after filtering ({} filtered out)",
            report.total_jobs, report.filtered_out
        );
        Ok(report)
    }
}

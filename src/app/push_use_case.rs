use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::observability::metrics;
use crate::pipeline::output;
use crate::storage::{JobStore, StoreJob};

#[derive(Debug, Default, Serialize)]
pub struct PushReport {
    pub total: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Upserts every job of an existing artifact into the persistent store
pub struct PushUseCase<'a> {
    store: &'a dyn JobStore,
}

impl<'a> PushUseCase<'a> {
    pub fn new(store: &'a dyn JobStore) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(input = %input.display()))]
    pub async fn run(&self, input: &Path) -> Result<PushReport> {
        let jobs = output::read_jobs(input).with_context(|| format!("reading {}", input.display()))?;
        let mut report = PushReport {
            total: jobs.len(),
            ..Default::default()
        };

        for job in &jobs {
            let outcome = self.store.upsert(&StoreJob::from(job)).await;
            match outcome.result {
                Ok(_) if outcome.is_new => {
                    report.inserted += 1;
                    metrics::sync::upsert_success(true);
                }
                Ok(_) => {
                    report.updated += 1;
                    metrics::sync::upsert_success(false);
                }
                Err(e) => {
                    warn!("Failed to store {}: {}", job.link, e);
                    report.failed += 1;
                    metrics::sync::upsert_error();
                }
            }
        }

        info!(
            "Pushed {} jobs: {} new, {} updated, {} failed",
            report.total, report.inserted, report.updated, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use crate::types::{NormalizedJob, RawJobRecord};

    fn job(link: &str, title: &str) -> NormalizedJob {
        NormalizedJob::from_raw(RawJobRecord {
            source: Some("Infra".to_string()),
            title: title.to_string(),
            location: "東京都 渋谷".to_string(),
            link: Some(link.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_push_counts_new_and_updated() {
        let store = InMemoryStore::with_jobs([StoreJob {
            url: "https://x/1".to_string(),
            title: "old title".to_string(),
            ..Default::default()
        }]);
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("jobs.json");
        output::write_jobs(&artifact, &[job("https://x/1", "new title"), job("https://x/2", "Webエンジニア")])
            .unwrap();

        let report = PushUseCase::new(&store).run(&artifact).await.unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 0);

        let stored = store.get("https://x/1").unwrap();
        assert_eq!(stored.title, "new title");
        assert_eq!(stored.site_name.as_deref(), Some("Infra"));
    }

    #[tokio::test]
    async fn test_push_missing_artifact_is_an_error() {
        let store = InMemoryStore::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(PushUseCase::new(&store).run(&dir.path().join("missing.json")).await.is_err());
    }
}

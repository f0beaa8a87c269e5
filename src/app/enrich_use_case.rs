use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::app::ports::{CopywriterPort, HttpClientPort};
use crate::config::EnrichConfig;
use crate::observability::metrics;
use crate::parser::{parse_job_detail, JobDetail};
use crate::pipeline::output;
use crate::types::NormalizedJob;

#[derive(Debug, Default, Serialize)]
pub struct EnrichReport {
    pub candidates: usize,
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
    pub rewritten: bool,
}

/// Fills in summaries, preview images and recommendation copy for jobs
/// whose listing pages carried no description.
pub struct EnrichUseCase {
    http: Box<dyn HttpClientPort>,
    copywriter: Box<dyn CopywriterPort>,
    config: EnrichConfig,
}

impl EnrichUseCase {
    pub fn new(http: Box<dyn HttpClientPort>, copywriter: Box<dyn CopywriterPort>, config: EnrichConfig) -> Self {
        Self {
            http,
            copywriter,
            config,
        }
    }

    fn is_candidate(&self, sources: &HashSet<&str>, job: &NormalizedJob) -> bool {
        job.source.as_deref().is_some_and(|s| sources.contains(s)) && !job.has_summary()
    }

    async fn fetch_detail(&self, url: &str) -> Result<JobDetail, String> {
        let resp = self.http.get(url).await?;
        if !resp.is_success() {
            return Err(format!("HTTP {}", resp.status));
        }
        Ok(parse_job_detail(&resp.text()))
    }

    async fn pause(&self) {
        let (min, max) = (self.config.min_delay_ms, self.config.max_delay_ms.max(self.config.min_delay_ms));
        let delay = rand::thread_rng().gen_range(min..=max);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    /// Enrich candidates in place, one request at a time
    pub async fn enrich(&self, jobs: &mut [NormalizedJob]) -> EnrichReport {
        let sources: HashSet<&str> = self.config.sources.iter().map(String::as_str).collect();
        let targets: Vec<usize> = jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| self.is_candidate(&sources, job))
            .map(|(idx, _)| idx)
            .collect();

        let mut report = EnrichReport {
            candidates: targets.len(),
            ..Default::default()
        };
        let limit = targets.len().min(self.config.batch_size);
        info!("📋 Found {} jobs to update, processing {}", targets.len(), limit);

        for (n, idx) in targets.into_iter().take(limit).enumerate() {
            if n > 0 {
                self.pause().await;
            }
            let job = &mut jobs[idx];
            report.processed += 1;
            info!("[{}/{}] Processing: {}", n + 1, limit, job.title);

            let started = Instant::now();
            let detail = self.fetch_detail(&job.link).await;
            metrics::enrich::fetch_duration(started.elapsed().as_secs_f64());

            let detail = match detail {
                Ok(detail) => {
                    metrics::enrich::page_success();
                    detail
                }
                Err(e) => {
                    warn!("⚠️ Error scraping {}: {}", job.link, e);
                    metrics::enrich::page_error();
                    report.failed += 1;
                    continue;
                }
            };

            let mut changed = false;
            if let Some(summary) = detail.summary {
                job.summary = Some(summary);
                changed = true;
            }
            if let Some(image_url) = detail.image_url {
                job.image_url = Some(image_url);
                changed = true;
            }
            if job.recommendation.is_none() {
                if let Some(message) = self.copywriter.recommend(job) {
                    job.recommendation = Some(message);
                    changed = true;
                }
            }
            if changed {
                report.updated += 1;
            }
        }

        report
    }

    /// Enrich the artifact at `path`, rewriting it only when a job changed
    #[instrument(skip_all, fields(artifact = %path.display()))]
    pub async fn run(&self, path: &Path) -> Result<EnrichReport> {
        let mut jobs = output::read_jobs(path).with_context(|| format!("reading {}", path.display()))?;
        let mut report = self.enrich(&mut jobs).await;

        if report.updated > 0 {
            output::write_jobs(path, &jobs).with_context(|| format!("writing {}", path.display()))?;
            report.rewritten = true;
            info!("💾 Saved {} jobs with new details to {}", report.updated, path.display());
        } else {
            info!("No changes to save");
        }
        Ok(report)
    }
}

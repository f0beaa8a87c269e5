//! Normalization pipeline: read each scraper's newest output, filter,
//! geo-tag, deduplicate and write the dataset served by the site.

pub mod batch;
pub mod filter;
pub mod merge;
pub mod normalize;
pub mod output;

use crate::config::{Config, SourceConfig};
use crate::error::Result;
use crate::observability::metrics;
use merge::{Merger, SourceBatch, SourceStats};
use normalize::JobNormalizer;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Result of a complete merge run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub sources: Vec<SourceStats>,
    pub total_jobs: usize,
    pub missing_link: usize,
    pub duplicates: usize,
    pub errors: Vec<String>,
    pub output_file: String,
}

pub struct Pipeline;

impl Pipeline {
    /// Read the newest file of every configured source. Sources without data
    /// are skipped; unreadable files are reported in the returned error list.
    pub fn collect_batches(sources: &[SourceConfig]) -> (Vec<SourceBatch>, Vec<String>) {
        let mut batches = Vec::new();
        let mut errors = Vec::new();

        for source in sources {
            let latest = match batch::latest_file(&source.dir, &source.extension) {
                Ok(Some(path)) => path,
                Ok(None) => {
                    warn!(source = %source.name, "No data found in {}", source.dir.display());
                    continue;
                }
                Err(e) => {
                    error!(source = %source.name, "Cannot list {}: {}", source.dir.display(), e);
                    metrics::merge::batch_failed(&source.name);
                    errors.push(format!("{}: {}", source.name, e));
                    continue;
                }
            };

            info!(source = %source.name, "Found {}", latest.display());
            match batch::read_batch(&latest) {
                Ok(records) => batches.push(SourceBatch::new(source.name.clone(), records)),
                Err(e) => {
                    error!(source = %source.name, "Error reading {}: {}", latest.display(), e);
                    metrics::merge::batch_failed(&source.name);
                    errors.push(format!("{} ({}): {}", source.name, latest.display(), e));
                }
            }
        }

        (batches, errors)
    }

    /// Run the complete merge: collect, normalize, deduplicate, write.
    #[instrument(skip_all, fields(output = %output.display()))]
    pub fn run(config: &Config, normalizer: &JobNormalizer, output: &Path) -> Result<PipelineResult> {
        info!("🚀 Merging job data with filters & normalization");
        let t_run = std::time::Instant::now();

        let (batches, errors) = Self::collect_batches(&config.sources);
        let outcome = Merger::new(normalizer).merge(batches);

        output::write_jobs(output, &outcome.jobs)?;
        metrics::merge::jobs_written(outcome.jobs.len());
        metrics::merge::duration(t_run.elapsed().as_secs_f64());

        Ok(PipelineResult {
            total_jobs: outcome.jobs.len(),
            sources: outcome.sources,
            missing_link: outcome.missing_link,
            duplicates: outcome.duplicates,
            errors,
            output_file: output.display().to_string(),
        })
    }
}

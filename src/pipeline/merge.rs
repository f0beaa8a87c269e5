use crate::observability::metrics;
use crate::pipeline::normalize::{JobNormalizer, Normalized};
use crate::pipeline::filter::Rejection;
use crate::types::{NormalizedJob, RawJobRecord};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// All records read from one source's newest output file
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub records: Vec<RawJobRecord>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>, records: Vec<RawJobRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }
}

/// Per-source counters for one merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub source: String,
    pub received: usize,
    pub admitted: usize,
    pub filtered_out: usize,
    pub prefecture_resolved: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeOutcome {
    pub jobs: Vec<NormalizedJob>,
    pub sources: Vec<SourceStats>,
    /// Admitted records that had no link and could not be keyed
    pub missing_link: usize,
    /// Admitted records overridden by a later record with the same link
    pub duplicates: usize,
}

/// Combines source batches into one deduplicated, id-stamped job list
pub struct Merger<'a> {
    normalizer: &'a JobNormalizer,
}

impl<'a> Merger<'a> {
    pub fn new(normalizer: &'a JobNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn merge(&self, batches: Vec<SourceBatch>) -> MergeOutcome {
        let mut combined = Vec::new();
        let mut sources = Vec::with_capacity(batches.len());

        for batch in batches {
            let stats = self.admit_batch(batch, &mut combined);
            info!(
                source = %stats.source,
                "Added {} jobs (filtered out {} noise jobs)",
                stats.admitted,
                stats.filtered_out
            );
            sources.push(stats);
        }

        let (unique, missing_link, duplicates) = dedupe_by_link(combined);
        metrics::merge::missing_link(missing_link);
        metrics::merge::duplicates_dropped(duplicates);

        let jobs: Vec<NormalizedJob> = unique.into_iter().filter_map(NormalizedJob::from_raw).collect();
        debug!(
            "Merged {} unique jobs ({} without link, {} duplicates)",
            jobs.len(),
            missing_link,
            duplicates
        );

        MergeOutcome {
            jobs,
            sources,
            missing_link,
            duplicates,
        }
    }

    fn admit_batch(&self, batch: SourceBatch, combined: &mut Vec<RawJobRecord>) -> SourceStats {
        let mut stats = SourceStats {
            source: batch.source.clone(),
            received: batch.records.len(),
            ..Default::default()
        };
        metrics::merge::records_received(&batch.source, batch.records.len());

        for mut record in batch.records {
            if record.source.as_deref().map_or(true, str::is_empty) {
                record.source = Some(batch.source.clone());
            }

            match self.normalizer.normalize(record) {
                Normalized::Admitted { record, localized } => {
                    if localized {
                        stats.prefecture_resolved += 1;
                    }
                    stats.admitted += 1;
                    metrics::merge::record_admitted(&batch.source);
                    combined.push(record);
                }
                Normalized::Rejected(reason) => {
                    stats.filtered_out += 1;
                    let reason = match reason {
                        Rejection::MissingRequiredKeyword => "missing_required",
                        Rejection::ExcludedKeyword(_) => "excluded_keyword",
                    };
                    metrics::merge::record_filtered(&batch.source, reason);
                }
            }
        }

        stats
    }
}

/// Key records by link, last write wins. A replaced record keeps the slot of
/// the first record with that link, so output order follows first arrival.
/// Returns the unique records plus the number without a link and the number
/// of overridden duplicates.
pub fn dedupe_by_link(records: Vec<RawJobRecord>) -> (Vec<RawJobRecord>, usize, usize) {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<RawJobRecord> = Vec::new();
    let mut missing_link = 0;
    let mut duplicates = 0;

    for record in records {
        let Some(link) = record.canonical_link().map(str::to_string) else {
            missing_link += 1;
            continue;
        };

        match slots.get(&link) {
            Some(&slot) => {
                duplicates += 1;
                unique[slot] = record;
            }
            None => {
                slots.insert(link, unique.len());
                unique.push(record);
            }
        }
    }

    (unique, missing_link, duplicates)
}

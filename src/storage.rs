use crate::types::{null_as_empty, Extras, NormalizedJob, RawJobRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// A row of the `jobs` table, keyed by its unique `url`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreJob {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extras,
}

fn take_string(extra: &mut Extras, key: &str) -> Option<String> {
    match extra.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Store rows use `site_name` and `url` where scrape-time records use
/// `source` and `link`.
impl From<StoreJob> for RawJobRecord {
    fn from(row: StoreJob) -> Self {
        let mut extra = row.extra;
        extra.remove("source");
        let link = take_string(&mut extra, "link")
            .or_else(|| Some(row.url.clone()).filter(|url| !url.is_empty()));

        RawJobRecord {
            source: row.site_name,
            title: row.title,
            summary: row.summary,
            location: row.location.unwrap_or_default(),
            link,
            url: Some(row.url).filter(|url| !url.is_empty()),
            prefecture: take_string(&mut extra, "prefecture"),
            image_url: take_string(&mut extra, "image_url"),
            recommendation: take_string(&mut extra, "recommendation"),
            created_at: row.created_at,
            updated_at: row.updated_at,
            extra,
        }
    }
}

impl From<&NormalizedJob> for StoreJob {
    fn from(job: &NormalizedJob) -> Self {
        StoreJob {
            url: job.link.clone(),
            title: job.title.clone(),
            summary: job.summary.clone(),
            location: Some(job.location.clone()),
            site_name: job.source.clone(),
            ..Default::default()
        }
    }
}

/// Outcome of an upsert. Failures carry the collaborator's error text.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub is_new: bool,
    pub result: Result<StoreJob, String>,
}

impl UpsertOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_new: false,
            result: Err(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrder {
    #[default]
    CreatedDesc,
    CreatedAsc,
}

/// Persistent job store collaborator.
///
/// Implementations never propagate transport errors: they log and return a
/// sentinel (`false`, `0`, an empty list, or a failed [`UpsertOutcome`]).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or update the row with the same `url`
    async fn upsert(&self, job: &StoreJob) -> UpsertOutcome;
    async fn exists(&self, url: &str) -> bool;
    /// Delete rows whose `updated_at` is older than `threshold`; returns the count
    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> usize;
    async fn fetch_all(&self, order: FetchOrder, limit: usize) -> Vec<StoreJob>;
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// In-memory store for development, dry runs and testing
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<HashMap<String, StoreJob>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: impl IntoIterator<Item = StoreJob>) -> Self {
        let rows = jobs.into_iter().map(|job| (job.url.clone(), job)).collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoreJob>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    pub fn get(&self, url: &str) -> Option<StoreJob> {
        self.rows().get(url).cloned()
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn upsert(&self, job: &StoreJob) -> UpsertOutcome {
        if job.url.is_empty() {
            return UpsertOutcome::failed("cannot upsert a job without url");
        }

        let now = Utc::now().to_rfc3339();
        let mut rows = self.rows();
        let existing_created = rows.get(&job.url).and_then(|row| row.created_at.clone());
        let is_new = !rows.contains_key(&job.url);

        let mut row = job.clone();
        row.created_at = existing_created
            .or_else(|| job.created_at.clone())
            .or_else(|| Some(now.clone()));
        row.updated_at = job.updated_at.clone().or(Some(now));
        rows.insert(row.url.clone(), row.clone());

        debug!("Upserted job {} (new: {})", row.url, is_new);
        UpsertOutcome {
            is_new,
            result: Ok(row),
        }
    }

    async fn exists(&self, url: &str) -> bool {
        self.rows().contains_key(url)
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> usize {
        let mut rows = self.rows();
        let before = rows.len();
        rows.retain(|_, row| {
            parse_timestamp(row.updated_at.as_deref()).map_or(true, |updated| updated >= threshold)
        });
        before - rows.len()
    }

    async fn fetch_all(&self, order: FetchOrder, limit: usize) -> Vec<StoreJob> {
        let mut jobs: Vec<StoreJob> = self.rows().values().cloned().collect();
        jobs.sort_by(|a, b| {
            let a_key = (parse_timestamp(a.created_at.as_deref()), &a.url);
            let b_key = (parse_timestamp(b.created_at.as_deref()), &b.url);
            match order {
                FetchOrder::CreatedDesc => b_key.cmp(&a_key),
                FetchOrder::CreatedAsc => a_key.cmp(&b_key),
            }
        });
        jobs.truncate(limit);
        jobs
    }
}

use crate::constants::DEFAULT_STORE_TABLE;
use crate::error::{AggregatorError, Result};
use crate::storage::{FetchOrder, JobStore, StoreJob, UpsertOutcome};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";

/// `jobs` table access through the Supabase PostgREST endpoint.
/// Config via env:
/// - SUPABASE_URL (e.g., https://xyzcompany.supabase.co)
/// - SUPABASE_KEY (anon or service role key)
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            key: key.into(),
            table: table.into(),
        }
    }

    /// Build from environment credentials. Missing credentials are a
    /// configuration error, reported before any store call is made.
    pub fn from_env(table: &str) -> Result<Self> {
        let url = non_empty_env(SUPABASE_URL_ENV);
        let key = non_empty_env(SUPABASE_KEY_ENV);
        match (url, key) {
            (Some(url), Some(key)) => {
                let table = if table.is_empty() { DEFAULT_STORE_TABLE } else { table };
                Ok(Self::new(url, key, table))
            }
            _ => Err(AggregatorError::Config(format!(
                "{} and {} must be set in environment variables",
                SUPABASE_URL_ENV, SUPABASE_KEY_ENV
            ))),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), self.table)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.endpoint())
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(AggregatorError::Store {
            status: status.as_u16(),
            message,
        })
    }

    async fn try_upsert(&self, job: &StoreJob) -> Result<StoreJob> {
        let mut row = job.clone();
        row.updated_at
            .get_or_insert_with(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        let resp = self
            .request(Method::POST)
            .query(&[("on_conflict", "url")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<StoreJob> = Self::check(resp).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| AggregatorError::Store {
            status: 200,
            message: format!("upsert of {} returned no representation", job.url),
        })
    }

    async fn try_exists(&self, url: &str) -> Result<bool> {
        let filter = format!("eq.{}", url);
        let resp = self
            .request(Method::GET)
            .query(&[("select", "id"), ("url", filter.as_str())])
            .send()
            .await?;
        let rows: Vec<Value> = Self::check(resp).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn try_delete_older_than(&self, threshold: DateTime<Utc>) -> Result<usize> {
        let filter = format!("lt.{}", threshold.to_rfc3339_opts(SecondsFormat::Secs, true));
        let resp = self
            .request(Method::DELETE)
            .query(&[("updated_at", filter.as_str())])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Value> = Self::check(resp).await?.json().await?;
        Ok(rows.len())
    }

    async fn try_fetch_all(&self, order: FetchOrder, limit: usize) -> Result<Vec<StoreJob>> {
        let order = match order {
            FetchOrder::CreatedDesc => "created_at.desc",
            FetchOrder::CreatedAsc => "created_at.asc",
        };
        let limit = limit.to_string();
        let resp = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", order), ("limit", limit.as_str())])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl JobStore for SupabaseStore {
    async fn upsert(&self, job: &StoreJob) -> UpsertOutcome {
        let is_new = !self.exists(&job.url).await;
        match self.try_upsert(job).await {
            Ok(row) => {
                debug!("Upserted {} (new: {})", row.url, is_new);
                UpsertOutcome {
                    is_new,
                    result: Ok(row),
                }
            }
            Err(e) => {
                warn!("⚠️ DB Error upserting {}: {}", job.url, e);
                UpsertOutcome::failed(e.to_string())
            }
        }
    }

    async fn exists(&self, url: &str) -> bool {
        match self.try_exists(url).await {
            Ok(found) => found,
            Err(e) => {
                warn!("⚠️ DB Error checking {}: {}", url, e);
                false
            }
        }
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> usize {
        match self.try_delete_older_than(threshold).await {
            Ok(count) => count,
            Err(e) => {
                warn!("⚠️ DB Delete Error: {}", e);
                0
            }
        }
    }

    async fn fetch_all(&self, order: FetchOrder, limit: usize) -> Vec<StoreJob> {
        match self.try_fetch_all(order, limit).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("⚠️ DB Fetch Error: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_table() {
        let store = SupabaseStore::new("https://abc.supabase.co/", "key", "jobs");
        assert_eq!(store.endpoint(), "https://abc.supabase.co/rest/v1/jobs");
    }

    #[tokio::test]
    async fn test_unreachable_store_returns_sentinels() {
        // nothing listens on port 9 locally
        let store = SupabaseStore::new("http://127.0.0.1:9", "key", "jobs");
        let job = StoreJob {
            url: "https://x/1".to_string(),
            ..Default::default()
        };

        assert!(!store.exists("https://x/1").await);
        assert_eq!(store.delete_older_than(Utc::now()).await, 0);
        assert!(store.fetch_all(FetchOrder::CreatedDesc, 10).await.is_empty());

        let outcome = store.upsert(&job).await;
        assert!(!outcome.is_new);
        assert!(outcome.result.is_err());
    }
}

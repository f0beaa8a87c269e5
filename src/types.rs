use crate::idempotency::compute_job_id;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Scraper fields the pipeline does not interpret (company, salary, tags, ...).
/// They ride along untouched into the output artifact.
pub type Extras = Map<String, Value>;

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One posting as emitted by a scraper, before filtering and normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJobRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extras,
}

impl RawJobRecord {
    /// Canonical link, if the record carries a non-empty one
    pub fn canonical_link(&self) -> Option<&str> {
        self.link.as_deref().filter(|link| !link.is_empty())
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// A filtered, geo-tagged, deduplicated posting as served to the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub id: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default)]
    pub prefecture: Option<String>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extras,
}

impl NormalizedJob {
    /// Promote a normalized raw record, assigning its link-derived id.
    /// Returns `None` for records without a link.
    pub fn from_raw(raw: RawJobRecord) -> Option<Self> {
        let link = raw.link.filter(|link| !link.is_empty())?;
        let mut extra = raw.extra;
        // upstream ids (store row ids, scraper ids) are replaced by ours
        extra.remove("id");

        Some(Self {
            id: compute_job_id(&link),
            source: raw.source,
            title: raw.title,
            summary: raw.summary,
            location: raw.location,
            prefecture: raw.prefecture,
            link,
            url: raw.url,
            image_url: raw.image_url,
            recommendation: raw.recommendation,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            extra,
        })
    }

    pub fn has_summary(&self) -> bool {
        self.summary.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

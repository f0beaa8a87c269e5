use crate::config::FilterConfig;
use crate::types::RawJobRecord;
use std::collections::HashSet;

/// Why a listing was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// None of the required keywords appear
    MissingRequiredKeyword,
    /// The listing mentions an out-of-scope job category
    ExcludedKeyword(String),
}

/// Keyword based admission rules for aggregator sources.
///
/// Sources outside `filtered_sources` are trusted and always admitted.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    filtered_sources: HashSet<String>,
    required: Vec<String>,
    excluded: Vec<String>,
}

impl ContentFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filtered_sources: config.filtered_sources.iter().cloned().collect(),
            required: config.required_keywords.clone(),
            excluded: config.excluded_keywords.clone(),
        }
    }

    pub fn applies_to(&self, source: Option<&str>) -> bool {
        source.is_some_and(|s| self.filtered_sources.contains(s))
    }

    pub fn is_admissible(&self, job: &RawJobRecord) -> bool {
        self.rejection(job).is_none()
    }

    /// `None` when the job is admissible, otherwise the first failed rule
    pub fn rejection(&self, job: &RawJobRecord) -> Option<Rejection> {
        if !self.applies_to(job.source_name()) {
            return None;
        }

        let text = searchable_text(job);

        // an empty required list disables the positive filter
        if !self.required.is_empty() && !self.required.iter().any(|kw| text.contains(kw.as_str())) {
            return Some(Rejection::MissingRequiredKeyword);
        }

        self.excluded
            .iter()
            .find(|kw| text.contains(kw.as_str()))
            .map(|kw| Rejection::ExcludedKeyword(kw.clone()))
    }
}

/// Title and summary concatenated with all whitespace removed, so keywords
/// split by line breaks or spacing still match.
fn searchable_text(job: &RawJobRecord) -> String {
    job.title
        .chars()
        .chain(job.summary.as_deref().unwrap_or_default().chars())
        .filter(|c| !c.is_whitespace())
        .collect()
}

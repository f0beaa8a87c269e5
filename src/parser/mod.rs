//! Detail-page extraction for job postings.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Fallback summaries are cut to this many characters
pub const FALLBACK_SUMMARY_CHARS: usize = 600;

const FALLBACK_SELECTORS: [&str; 2] = [".job-description", ".post-content"];

static BR_TAG: OnceLock<Option<Regex>> = OnceLock::new();

/// Fields recovered from a posting's detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDetail {
    pub summary: Option<String>,
    pub image_url: Option<String>,
}

impl JobDetail {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.image_url.is_none()
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extract the summary and preview image from a detail page.
///
/// The summary comes from the JSON-LD `description` when present, otherwise
/// from the first `.job-description` / `.post-content` block.
pub fn parse_job_detail(html: &str) -> JobDetail {
    let document = Html::parse_document(html);

    let summary = json_ld_description(&document)
        .and_then(|raw| clean_description(&raw))
        .or_else(|| fallback_summary(&document));

    let image_url = selector("meta[property=\"og:image\"]").and_then(|sel| {
        document
            .select(&sel)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    });

    debug!(
        "Parsed detail page: summary={} image={}",
        summary.is_some(),
        image_url.is_some()
    );
    JobDetail { summary, image_url }
}

fn json_ld_description(document: &Html) -> Option<String> {
    let sel = selector("script[type=\"application/ld+json\"]")?;
    let script = document.select(&sel).next()?;
    let text: String = script.text().collect();

    let data: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!("⚠️ Failed to parse JSON-LD: {}", e);
            return None;
        }
    };
    let data = match data {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };

    data.get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Turn `<br>` variants into line breaks, strip remaining markup, trim each
/// text run and drop empty ones.
fn clean_description(raw: &str) -> Option<String> {
    let with_breaks = match BR_TAG.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").ok()) {
        Some(re) => re.replace_all(raw, "\n").into_owned(),
        None => raw.to_string(),
    };

    let fragment = Html::parse_fragment(&with_breaks);
    let text = fragment
        .root_element()
        .text()
        .flat_map(|run| run.split('\n'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}

fn fallback_summary(document: &Html) -> Option<String> {
    let element = FALLBACK_SELECTORS
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| document.select(&sel).next())?;

    let text: String = element
        .text()
        .map(str::trim)
        .collect::<String>()
        .chars()
        .take(FALLBACK_SUMMARY_CHARS)
        .collect();

    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_ld_description_with_breaks() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type": "JobPosting", "description": "未経験歓迎！<br>Webデザイン業務<BR/>  <b>研修あり</b> <br />"}
            </script>
            <meta property="og:image" content="https://example.com/og.png">
            </head><body></body></html>"#;

        let detail = parse_job_detail(html);
        assert_eq!(
            detail.summary.as_deref(),
            Some("未経験歓迎！\nWebデザイン業務\n研修あり")
        );
        assert_eq!(detail.image_url.as_deref(), Some("https://example.com/og.png"));
    }

    #[test]
    fn test_json_ld_array_uses_first_element() {
        let html = r#"<script type="application/ld+json">
            [{"description": "最初の求人"}, {"description": "二番目"}]
            </script>"#;
        let detail = parse_job_detail(html);
        assert_eq!(detail.summary.as_deref(), Some("最初の求人"));
        assert_eq!(detail.image_url, None);
    }

    #[test]
    fn test_fallback_selector_is_truncated() {
        let body = "あ".repeat(700);
        let html = format!(
            r#"<html><body><div class="post-content"><p>{}</p></div></body></html>"#,
            body
        );
        let detail = parse_job_detail(&html);
        let summary = detail.summary.unwrap();
        assert_eq!(summary.chars().count(), FALLBACK_SUMMARY_CHARS);
    }

    #[test]
    fn test_job_description_preferred_over_post_content() {
        let html = r#"<div class="post-content">後</div><div class="job-description"> 先 </div>"#;
        let detail = parse_job_detail(html);
        assert_eq!(detail.summary.as_deref(), Some("先"));
    }

    #[test]
    fn test_invalid_json_ld_falls_back() {
        let html = r#"<script type="application/ld+json">{not json</script>
            <div class="job-description">本文</div>"#;
        let detail = parse_job_detail(html);
        assert_eq!(detail.summary.as_deref(), Some("本文"));
    }

    #[test]
    fn test_page_without_details_is_empty() {
        let detail = parse_job_detail("<html><body><p>nothing</p></body></html>");
        assert!(detail.is_empty());
    }
}

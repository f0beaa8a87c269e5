use crate::types::NormalizedJob;
use async_trait::async_trait;

#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Produces the short recommendation blurb shown on a job card
pub trait CopywriterPort: Send + Sync {
    fn recommend(&self, job: &NormalizedJob) -> Option<String>;
}

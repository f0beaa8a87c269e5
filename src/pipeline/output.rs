use crate::error::Result;
use crate::types::NormalizedJob;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write the site dataset: a pretty-printed JSON array, non-ASCII kept as is.
/// Parent directories are created when missing.
pub fn write_jobs(path: &Path, jobs: &[NormalizedJob]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, jobs)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!("Wrote {} jobs to {}", jobs.len(), path.display());
    Ok(())
}

pub fn read_jobs(path: &Path) -> Result<Vec<NormalizedJob>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawJobRecord;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_dirs_and_keeps_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("src/data/jobs.json");
        let job = NormalizedJob::from_raw(RawJobRecord {
            source: Some("Infra".to_string()),
            title: "サーバーエンジニア".to_string(),
            location: "東京都 五反田".to_string(),
            prefecture: Some("東京都".to_string()),
            link: Some("https://x/1".to_string()),
            ..Default::default()
        })
        .unwrap();

        write_jobs(&path, std::slice::from_ref(&job)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.trim_start().starts_with('['));
        assert!(text.contains("サーバーエンジニア"));
        assert_eq!(read_jobs(&path).unwrap(), vec![job]);
    }
}

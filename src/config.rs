use crate::constants;
use crate::error::{AggregatorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub sources: Vec<SourceConfig>,
    pub filter: FilterConfig,
    pub sync: SyncConfig,
    pub enrich: EnrichConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON artifact consumed by the site
    pub output_file: PathBuf,
    /// Station table used to infer prefectures
    pub station_csv: PathBuf,
}

/// One scraper whose newest output file is merged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub filtered_sources: Vec<String>,
    pub required_keywords: Vec<String>,
    pub excluded_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub table: String,
    pub retention_days: i64,
    pub fetch_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub sources: Vec<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub user_agent: String,
}

/// A century; anything longer cannot be subtracted from the current time
const MAX_RETENTION_DAYS: i64 = 36_500;

fn default_extension() -> String {
    "json".to_string()
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            sources: SourceConfig::defaults(),
            filter: FilterConfig::default(),
            sync: SyncConfig::default(),
            enrich: EnrichConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(constants::DEFAULT_OUTPUT_FILE),
            station_csv: PathBuf::from(constants::DEFAULT_STATION_CSV),
        }
    }
}

impl SourceConfig {
    pub fn new(name: &str, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.into(),
            extension: default_extension(),
        }
    }

    fn defaults() -> Vec<Self> {
        vec![
            Self::new(constants::INFRA_SOURCE, constants::INFRA_OUTPUT_DIR),
            Self::new(constants::ZEROONE_SOURCE, constants::ZEROONE_OUTPUT_DIR),
            Self::new(constants::INDEED_SOURCE, constants::INDEED_OUTPUT_DIR),
            Self::new(constants::KYUJINBOX_SOURCE, constants::KYUJINBOX_OUTPUT_DIR),
        ]
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filtered_sources: owned(&constants::FILTERED_SOURCES),
            required_keywords: owned(&constants::REQUIRED_KEYWORDS),
            excluded_keywords: owned(&constants::EXCLUDED_KEYWORDS),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            table: constants::DEFAULT_STORE_TABLE.to_string(),
            retention_days: 30,
            fetch_limit: 2000,
        }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            sources: owned(&constants::ENRICHED_SOURCES),
            batch_size: 100,
            timeout_secs: 60,
            min_delay_ms: 2000,
            max_delay_ms: 4000,
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Read and parse a TOML config file. Any field left out falls back to its default.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AggregatorError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given (failing if it cannot be read); otherwise use
    /// `config.toml` when present and built-in defaults when it is not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    info!("No {} found, using built-in defaults", constants::DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.enrich.min_delay_ms > self.enrich.max_delay_ms {
            return Err(AggregatorError::Config(format!(
                "enrich.min_delay_ms ({}) exceeds enrich.max_delay_ms ({})",
                self.enrich.min_delay_ms, self.enrich.max_delay_ms
            )));
        }
        if !(0..=MAX_RETENTION_DAYS).contains(&self.sync.retention_days) {
            return Err(AggregatorError::Config(format!(
                "sync.retention_days must be between 0 and {}, got {}",
                MAX_RETENTION_DAYS, self.sync.retention_days
            )));
        }
        Ok(())
    }
}

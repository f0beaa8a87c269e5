/// Source name constants to ensure consistency across the codebase.
/// These are the values written to the `source` field of every job.

pub const INFRA_SOURCE: &str = "Infra";
pub const ZEROONE_SOURCE: &str = "ZeroOne";
pub const INDEED_SOURCE: &str = "Indeed";
pub const KYUJINBOX_SOURCE: &str = "Kyujinbox";

/// Location sentinel some scrapers emit when a posting has no location
pub const LOCATION_UNKNOWN: &str = "N/A";

// Default scraper output directories, relative to the site project root
pub const INFRA_OUTPUT_DIR: &str = "../infra-scraping/output";
pub const ZEROONE_OUTPUT_DIR: &str = "../zeroone-scraping/output";
pub const INDEED_OUTPUT_DIR: &str = "../indeed-scraping/output";
pub const KYUJINBOX_OUTPUT_DIR: &str = "../kyujin-scraping/output";

pub const DEFAULT_OUTPUT_FILE: &str = "src/data/jobs.json";
pub const DEFAULT_STATION_CSV: &str = "station20251211free.csv";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_STORE_TABLE: &str = "jobs";

/// Aggregator sources whose listings are keyword filtered
pub const FILTERED_SOURCES: [&str; 2] = [INDEED_SOURCE, KYUJINBOX_SOURCE];

/// Sources whose detail pages are fetched during enrichment
pub const ENRICHED_SOURCES: [&str; 2] = [INFRA_SOURCE, ZEROONE_SOURCE];

/// At least one of these must appear in a filtered listing
pub const REQUIRED_KEYWORDS: [&str; 2] = ["未経験", "初心者"];

/// Job categories outside the audience of the site
pub const EXCLUDED_KEYWORDS: [&str; 25] = [
    "軽作業", "倉庫", "仕分け", "ピッキング", "梱包",
    "ホール", "キッチン", "調理", "清掃", "警備",
    "コンビニ", "レジ", "ドライバー", "配送", "配達",
    "工場", "製造", "ライン作業", "パチンコ", "カラオケ",
    "引越", "施工管理", "看護師", "薬剤師", "介護",
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";


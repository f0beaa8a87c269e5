use job_aggregator::config::{Config, SourceConfig};
use job_aggregator::geo::{Gazetteer, RegionResolver};
use job_aggregator::idempotency::compute_job_id;
use job_aggregator::pipeline::filter::ContentFilter;
use job_aggregator::pipeline::normalize::JobNormalizer;
use job_aggregator::pipeline::output::read_jobs;
use job_aggregator::pipeline::Pipeline;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const STATIONS: &str = "station_cd,station_name,pref_cd\n1130201,五反田,13\n2800101,三宮,28\n";

fn write_source(root: &Path, name: &str, records: serde_json::Value) -> SourceConfig {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("jobs_20251211.json"), records.to_string()).unwrap();
    SourceConfig::new(name, dir)
}

fn normalizer(config: &Config) -> JobNormalizer {
    let gazetteer = Gazetteer::load(&config.paths.station_csv);
    JobNormalizer::new(
        ContentFilter::new(&config.filter),
        RegionResolver::new(Arc::new(gazetteer)),
    )
}

#[test]
fn test_merge_filters_geotags_and_dedupes() {
    let root = tempdir().unwrap();
    let station_csv = root.path().join("stations.csv");
    fs::write(&station_csv, STATIONS).unwrap();

    let mut config = Config::default();
    config.paths.station_csv = station_csv;
    config.sources = vec![
        write_source(
            root.path(),
            "Infra",
            json!([
                {"title": "インフラエンジニア", "location": "五反田駅徒歩5分", "link": "https://x/1"},
                {"title": "サーバー監視", "location": "三宮駅", "link": "https://x/3"},
                {"title": "リンクなし", "location": "N/A"}
            ]),
        ),
        write_source(
            root.path(),
            "Indeed",
            json!({"jobs": [
                {"title": "未経験歓迎の倉庫作業", "location": "大阪府", "link": "https://x/2"},
                {"title": "未経験OK Webデザイナー", "location": "東京都渋谷区", "link": "https://x/1", "company": "ACME"}
            ]}),
        ),
    ];
    let output = root.path().join("site").join("jobs.json");

    let result = Pipeline::run(&config, &normalizer(&config), &output).unwrap();
    assert!(result.errors.is_empty());
    assert_eq!(result.total_jobs, 2);
    assert_eq!(result.duplicates, 1);
    assert_eq!(result.missing_link, 1);
    assert_eq!(result.sources[1].filtered_out, 1);

    let jobs = read_jobs(&output).unwrap();
    assert_eq!(jobs.len(), 2);

    // the later source wins but keeps the first slot
    assert_eq!(jobs[0].link, "https://x/1");
    assert_eq!(jobs[0].id, compute_job_id("https://x/1"));
    assert_eq!(jobs[0].source.as_deref(), Some("Indeed"));
    assert_eq!(jobs[0].prefecture.as_deref(), Some("東京都"));
    assert_eq!(jobs[0].extra.get("company"), Some(&json!("ACME")));

    assert_eq!(jobs[1].prefecture.as_deref(), Some("兵庫県"));
    assert_eq!(jobs[1].location, "兵庫県 三宮駅");
}

#[test]
fn test_merge_station_example() {
    let root = tempdir().unwrap();
    let station_csv = root.path().join("stations.csv");
    fs::write(&station_csv, STATIONS).unwrap();

    let mut config = Config::default();
    config.paths.station_csv = station_csv;
    config.sources = vec![write_source(
        root.path(),
        "Infra",
        json!([{"title": "インフラエンジニア", "location": "五反田駅徒歩5分", "link": "https://x/1"}]),
    )];
    let output = root.path().join("jobs.json");

    Pipeline::run(&config, &normalizer(&config), &output).unwrap();
    let jobs = read_jobs(&output).unwrap();
    assert_eq!(jobs[0].location, "東京都 五反田駅徒歩5分");
    assert_eq!(jobs[0].source.as_deref(), Some("Infra"));
}

#[test]
fn test_missing_station_csv_still_merges() {
    let root = tempdir().unwrap();
    let mut config = Config::default();
    config.paths.station_csv = root.path().join("absent.csv");
    config.sources = vec![write_source(
        root.path(),
        "ZeroOne",
        json!([
            {"title": "Webデザイナー", "location": "五反田駅", "link": "https://x/1"},
            {"title": "編集アシスタント", "location": "京都府京都市", "link": "https://x/2"}
        ]),
    )];
    let output = root.path().join("jobs.json");

    let result = Pipeline::run(&config, &normalizer(&config), &output).unwrap();
    assert_eq!(result.total_jobs, 2);

    let jobs = read_jobs(&output).unwrap();
    assert_eq!(jobs[0].prefecture, None);
    assert_eq!(jobs[0].location, "五反田駅");
    assert_eq!(jobs[1].prefecture.as_deref(), Some("京都府"));
}

#[test]
fn test_missing_source_directory_is_skipped() {
    let root = tempdir().unwrap();
    let mut config = Config::default();
    config.paths.station_csv = root.path().join("absent.csv");
    config.sources = vec![SourceConfig::new("Kyujinbox", root.path().join("nowhere"))];
    let output = root.path().join("jobs.json");

    let result = Pipeline::run(&config, &normalizer(&config), &output).unwrap();
    assert_eq!(result.total_jobs, 0);
    assert!(result.errors.is_empty());
    assert!(read_jobs(&output).unwrap().is_empty());
}

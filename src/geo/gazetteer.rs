use crate::error::{AggregatorError, Result};
use crate::geo::prefectures;
use csv::ReaderBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const STATION_NAME_COLUMN: &str = "station_name";
const PREF_CODE_COLUMN: &str = "pref_cd";

/// A station name and every prefecture that has a station by that name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerEntry {
    pub station_name: String,
    pub regions: BTreeSet<String>,
}

/// Station name to prefecture lookup table.
///
/// Built once per run and never mutated afterwards; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    /// Empty gazetteer: resolution falls back to direct prefecture names only
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(station, prefecture)` pairs. Repeated station names merge.
    pub fn from_pairs<I, S, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: Into<String>,
    {
        let mut stations: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (station, region) in pairs {
            stations.entry(station.into()).or_default().insert(region.into());
        }
        Self::from_map(stations)
    }

    fn from_map(stations: BTreeMap<String, BTreeSet<String>>) -> Self {
        let entries = stations
            .into_iter()
            .map(|(station_name, regions)| GazetteerEntry { station_name, regions })
            .collect();
        Self { entries }
    }

    /// Load the station CSV, degrading to an empty gazetteer on any file-level failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(gazetteer) => gazetteer,
            Err(e) => {
                warn!(
                    "Station data unavailable at {} ({}); prefecture detection limited to direct matches",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let gazetteer = Self::from_reader(file)?;
        info!(
            "Loaded {} station names from {}",
            gazetteer.len(),
            path.display()
        );
        Ok(gazetteer)
    }

    /// Parse station rows from CSV with a header row.
    ///
    /// Rows whose `pref_cd` is not a valid 1..=47 code are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
                .ok_or_else(|| AggregatorError::MissingField(wanted.to_string()))
        };
        let name_idx = column(STATION_NAME_COLUMN)?;
        let code_idx = column(PREF_CODE_COLUMN)?;

        let mut stations: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut rows = 0usize;
        let mut skipped = 0usize;

        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping unreadable station row {}: {}", line + 2, e);
                    skipped += 1;
                    continue;
                }
            };

            let name = record.get(name_idx).map(str::trim).unwrap_or_default();
            let region = record
                .get(code_idx)
                .and_then(|code| code.trim().parse::<u32>().ok())
                .and_then(prefectures::name_for_code);

            match region {
                Some(region) if !name.is_empty() => {
                    stations
                        .entry(name.to_string())
                        .or_default()
                        .insert(region.to_string());
                    rows += 1;
                }
                _ => skipped += 1,
            }
        }

        debug!("Station rows loaded={} skipped={}", rows, skipped);
        Ok(Self::from_map(stations))
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn regions_for(&self, station_name: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .binary_search_by(|entry| entry.station_name.as_str().cmp(station_name))
            .ok()
            .map(|idx| &self.entries[idx].regions)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}station_cd,station_name,line_cd,pref_cd\n\
        1130101,五反田,11301,13\n\
        1130102,府中,11302,13\n\
        1130103,府中,11303,34\n\
        1130104,府中,11304,13\n\
        9999999,幻,99999,99\n\
        9999998,壊れた,99998,abc\n";

    #[test]
    fn test_merges_same_named_stations() {
        let gazetteer = Gazetteer::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(gazetteer.len(), 2);
        let fuchu: Vec<&str> = gazetteer
            .regions_for("府中")
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(fuchu, vec!["広島県", "東京都"]);
        assert!(gazetteer.regions_for("五反田").unwrap().contains("東京都"));
    }

    #[test]
    fn test_skips_unmapped_and_malformed_codes() {
        let gazetteer = Gazetteer::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(gazetteer.regions_for("幻").is_none());
        assert!(gazetteer.regions_for("壊れた").is_none());
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let result = Gazetteer::from_reader("name,pref\n渋谷,13\n".as_bytes());
        assert!(matches!(result, Err(AggregatorError::MissingField(_))));
    }

    #[test]
    fn test_load_missing_file_degrades_to_empty() {
        let gazetteer = Gazetteer::load(Path::new("no/such/stations.csv"));
        assert!(gazetteer.is_empty());
    }

    #[test]
    fn test_from_pairs() {
        let gazetteer = Gazetteer::from_pairs([("五反田", "東京都"), ("本町", "大阪府"), ("本町", "東京都")]);
        assert_eq!(gazetteer.len(), 2);
        assert_eq!(gazetteer.regions_for("本町").unwrap().len(), 2);
    }
}

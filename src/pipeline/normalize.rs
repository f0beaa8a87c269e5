use crate::geo::{prefixed_location, RegionResolver};
use crate::pipeline::filter::{ContentFilter, Rejection};
use crate::types::RawJobRecord;
use tracing::debug;

/// Result of running a single record through filtering and geo-tagging
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// `localized` is set when the resolver found a prefecture for this record
    Admitted { record: RawJobRecord, localized: bool },
    Rejected(Rejection),
}

/// Applies the content filter and prefecture inference to raw records.
/// Shared by the merge pipeline and the store sync.
#[derive(Debug, Clone)]
pub struct JobNormalizer {
    filter: ContentFilter,
    resolver: RegionResolver,
}

impl JobNormalizer {
    pub fn new(filter: ContentFilter, resolver: RegionResolver) -> Self {
        Self { filter, resolver }
    }

    pub fn normalize(&self, mut record: RawJobRecord) -> Normalized {
        if let Some(rejection) = self.filter.rejection(&record) {
            debug!(title = %record.title, ?rejection, "Filtered out listing");
            return Normalized::Rejected(rejection);
        }

        let localized = self.localize(&mut record);
        Normalized::Admitted { record, localized }
    }

    /// Tag the record with its prefecture and make sure the displayed
    /// location starts with it. Returns whether a prefecture was found.
    pub fn localize(&self, record: &mut RawJobRecord) -> bool {
        match self.resolver.resolve(&record.location) {
            Some(prefecture) => {
                record.location = prefixed_location(&record.location, &prefecture);
                record.prefecture = Some(prefecture);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::geo::Gazetteer;
    use std::sync::Arc;

    fn normalizer() -> JobNormalizer {
        let gazetteer = Gazetteer::from_pairs([("五反田", "東京都")]);
        JobNormalizer::new(
            ContentFilter::new(&FilterConfig::default()),
            RegionResolver::new(Arc::new(gazetteer)),
        )
    }

    #[test]
    fn test_admitted_record_is_geo_tagged() {
        let record = RawJobRecord {
            source: Some("Infra".to_string()),
            title: "インフラエンジニア".to_string(),
            location: "五反田駅徒歩5分".to_string(),
            ..Default::default()
        };

        match normalizer().normalize(record) {
            Normalized::Admitted { record: job, localized } => {
                assert!(localized);
                assert_eq!(job.prefecture.as_deref(), Some("東京都"));
                assert_eq!(job.location, "東京都 五反田駅徒歩5分");
            }
            other => panic!("expected admission, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_location_is_left_alone() {
        let mut record = RawJobRecord {
            location: "N/A".to_string(),
            prefecture: Some("大阪府".to_string()),
            ..Default::default()
        };
        assert!(!normalizer().localize(&mut record));
        assert_eq!(record.location, "N/A");
        // an upstream prefecture survives when nothing better is found
        assert_eq!(record.prefecture.as_deref(), Some("大阪府"));
    }

    #[test]
    fn test_kept_upstream_prefecture_is_not_reported_as_localized() {
        let record = RawJobRecord {
            source: Some("ZeroOne".to_string()),
            title: "Webデザイナー".to_string(),
            location: "フルリモート".to_string(),
            prefecture: Some("大阪府".to_string()),
            ..Default::default()
        };

        match normalizer().normalize(record) {
            Normalized::Admitted { record, localized } => {
                assert!(!localized);
                assert_eq!(record.prefecture.as_deref(), Some("大阪府"));
            }
            other => panic!("expected admission, got {:?}", other),
        }
    }

    #[test]
    fn test_rejected_record_reports_reason() {
        let record = RawJobRecord {
            source: Some("Indeed".to_string()),
            title: "未経験歓迎の倉庫作業".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            normalizer().normalize(record),
            Normalized::Rejected(Rejection::ExcludedKeyword(_))
        ));
    }
}

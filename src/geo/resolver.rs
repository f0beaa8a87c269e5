use crate::constants::LOCATION_UNKNOWN;
use crate::geo::gazetteer::Gazetteer;
use crate::geo::prefectures::{self, PREFECTURES, PRIORITY_PREFECTURES};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Station names shorter than this match far too many unrelated strings
const MIN_STATION_CHARS: usize = 2;

/// Infers a prefecture from free-text location strings such as
/// "五反田駅徒歩5分" or "東京都品川区".
#[derive(Debug, Clone)]
pub struct RegionResolver {
    gazetteer: Arc<Gazetteer>,
}

impl RegionResolver {
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self { gazetteer }
    }

    /// Resolver without station data; only literal prefecture names match
    pub fn direct_only() -> Self {
        Self::new(Arc::new(Gazetteer::empty()))
    }

    /// Best-guess prefecture for `location`.
    ///
    /// A literal prefecture name wins outright. Otherwise every station name
    /// found in the text contributes its prefectures, and the candidates are
    /// ranked by [`PRIORITY_PREFECTURES`], then by lowest JIS code.
    pub fn resolve(&self, location: &str) -> Option<String> {
        if location.is_empty() || location == LOCATION_UNKNOWN {
            return None;
        }

        if let Some(pref) = PREFECTURES.iter().find(|pref| location.contains(*pref)) {
            return Some(pref.to_string());
        }

        let candidates = self.station_candidates(location);
        if candidates.is_empty() {
            return None;
        }

        if let Some(pref) = PRIORITY_PREFECTURES
            .iter()
            .find(|pref| candidates.contains(**pref))
        {
            return Some(pref.to_string());
        }

        candidates
            .into_iter()
            .min_by(|a, b| {
                let rank = |name: &str| prefectures::code_for_name(name).unwrap_or(u32::MAX);
                rank(*a).cmp(&rank(*b)).then_with(|| a.cmp(b))
            })
            .map(str::to_string)
    }

    fn station_candidates<'a>(&'a self, location: &str) -> BTreeSet<&'a str> {
        self.gazetteer
            .entries()
            .iter()
            .filter(|entry| entry.station_name.chars().count() >= MIN_STATION_CHARS)
            .filter(|entry| location.contains(entry.station_name.as_str()))
            .flat_map(|entry| entry.regions.iter().map(String::as_str))
            .collect()
    }
}

/// Prefix `location` with the prefecture unless the text already names it
pub fn prefixed_location(location: &str, prefecture: &str) -> String {
    if location.contains(prefecture) {
        location.to_string()
    } else {
        format!("{} {}", prefecture, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(pairs: &[(&str, &str)]) -> RegionResolver {
        RegionResolver::new(Arc::new(Gazetteer::from_pairs(pairs.iter().copied())))
    }

    #[test]
    fn test_station_suffix_example() {
        let resolver = resolver(&[("五反田", "東京都")]);
        let pref = resolver.resolve("五反田駅徒歩5分").unwrap();
        assert_eq!(pref, "東京都");
        assert_eq!(prefixed_location("五反田駅徒歩5分", &pref), "東京都 五反田駅徒歩5分");
    }

    #[test]
    fn test_empty_and_sentinel_locations() {
        let resolver = resolver(&[("五反田", "東京都")]);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("N/A"), None);
    }

    #[test]
    fn test_direct_match_dominates_station_match() {
        // 梅田 points at Osaka, but the text names Fukuoka explicitly
        let resolver = resolver(&[("梅田", "大阪府"), ("博多", "福岡県")]);
        assert_eq!(resolver.resolve("福岡県 梅田ビル内").as_deref(), Some("福岡県"));
        assert_eq!(resolver.resolve("大阪府大阪市北区").as_deref(), Some("大阪府"));
    }

    #[test]
    fn test_direct_match_works_without_gazetteer() {
        let resolver = RegionResolver::direct_only();
        assert_eq!(resolver.resolve("北海道札幌市").as_deref(), Some("北海道"));
        assert_eq!(resolver.resolve("五反田駅徒歩5分"), None);
    }

    #[test]
    fn test_no_match_returns_none() {
        let resolver = resolver(&[("五反田", "東京都")]);
        assert_eq!(resolver.resolve("フルリモート"), None);
    }

    #[test]
    fn test_priority_order_breaks_shared_station_names() {
        let three_way = resolver(&[("本町", "千葉県"), ("本町", "大阪府"), ("本町", "東京都")]);
        assert_eq!(three_way.resolve("本町駅前").as_deref(), Some("東京都"));

        let two_way = resolver(&[("本町", "千葉県"), ("本町", "大阪府")]);
        assert_eq!(two_way.resolve("本町駅前").as_deref(), Some("大阪府"));
    }

    #[test]
    fn test_candidates_union_across_stations() {
        // two different stations in the text; the higher priority one wins
        let resolver = resolver(&[("鹿児島中央", "鹿児島県"), ("栄", "愛知県"), ("栄町", "愛知県")]);
        assert_eq!(resolver.resolve("鹿児島中央から栄町へ").as_deref(), Some("愛知県"));
    }

    #[test]
    fn test_single_character_stations_are_ignored() {
        let resolver = resolver(&[("栄", "愛知県")]);
        assert_eq!(resolver.resolve("栄駅"), None);
    }

    #[test]
    fn test_fallback_prefers_lowest_prefecture_code() {
        let resolver = resolver(&[("府中", "広島県"), ("府中", "徳島県")]);
        // 広島県 is 34, 徳島県 is 36
        assert_eq!(resolver.resolve("府中駅").as_deref(), Some("広島県"));
    }

    #[test]
    fn test_prefixed_location_is_idempotent() {
        assert_eq!(prefixed_location("東京都 渋谷", "東京都"), "東京都 渋谷");
        assert_eq!(prefixed_location("渋谷", "東京都"), "東京都 渋谷");
    }
}

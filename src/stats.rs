//! Derived statistics. Everything here is a pure function of the catalog and
//! the progress store; the dataset is small enough that the stats are
//! recomputed on every render instead of cached.

use crate::catalog::{Catalog, Province};
use crate::level::TravelLevel;
use crate::store::ProgressStore;

/// Approximate land area of China in square kilometers; the denominator of
/// the coverage percentage.
pub const TOTAL_LAND_AREA_KM2: f64 = 9_600_000.0;

/// Gamified tiers: inclusive lower score bounds, level number, title.
const TIERS: [(u32, u8, &str); 6] = [
    (0, 1, "旅行新手"),
    (100, 2, "初级探索者"),
    (500, 3, "进阶旅行家"),
    (1500, 4, "资深向导"),
    (3000, 5, "华夏通"),
    (5000, 6, "传奇行者"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    /// Provinces with at least one lit city.
    pub province_count: usize,
    /// Cities with any level above `Untouched`.
    pub city_count: usize,
    /// Weighted sum over all cities (Passed 10, Visited 30, Lived 100).
    pub score: u32,
    /// Sum over provinces of `area * lit / total`.
    pub explored_area_km2: f64,
    /// `explored_area_km2` against the fixed total land area, in percent.
    pub coverage_percent: f64,
    pub level: u8,
    pub title: &'static str,
}

impl DerivedStats {
    /// Explored area in 万km², the display unit.
    pub fn explored_area_wan_km2(&self) -> f64 {
        self.explored_area_km2 / 10_000.0
    }
}

pub fn compute(catalog: &Catalog, progress: &ProgressStore) -> DerivedStats {
    let mut province_count = 0;
    let mut city_count = 0;
    let mut score = 0u32;
    let mut explored_area_km2 = 0.0;

    for province in catalog.provinces() {
        let mut hits = 0usize;
        for city in &province.cities {
            let level = progress.get(&city.id);
            if level > TravelLevel::Untouched {
                hits += 1;
            }
            score += level.score();
        }
        if hits > 0 {
            province_count += 1;
            explored_area_km2 += province.area_km2 * hits as f64 / province.cities.len() as f64;
        }
        city_count += hits;
    }

    let (level, title) = tier_for(score);
    DerivedStats {
        province_count,
        city_count,
        score,
        explored_area_km2,
        coverage_percent: explored_area_km2 / TOTAL_LAND_AREA_KM2 * 100.0,
        level,
        title,
    }
}

/// Highest tier whose threshold the score meets.
pub fn tier_for(score: u32) -> (u8, &'static str) {
    let (_, level, title) = TIERS
        .iter()
        .rev()
        .find(|(min, _, _)| score >= *min)
        .copied()
        .unwrap_or(TIERS[0]);
    (level, title)
}

/// Lit-city count for one province, shown on the list rows.
pub fn province_hits(province: &Province, progress: &ProgressStore) -> usize {
    province
        .cities
        .iter()
        .filter(|c| progress.get(&c.id) > TravelLevel::Untouched)
        .count()
}

/// Color intensity for the map: sum of level ordinals over the province's
/// maximum, floored at 0.1 once anything is lit. 0.0 means untouched.
pub fn province_ratio(province: &Province, progress: &ProgressStore) -> f64 {
    let total: u32 = province
        .cities
        .iter()
        .map(|c| progress.get(&c.id).ordinal() as u32)
        .sum();
    if total == 0 {
        return 0.0;
    }
    let max = (province.cities.len() * 3) as f64;
    (total as f64 / max).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::City;
    use crate::store::{ProgressStore, StorageBackend};
    use crate::error::StoreError;

    struct NullBackend;

    impl StorageBackend for NullBackend {
        fn load(&self) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn save(&self, _payload: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn empty_store() -> ProgressStore {
        ProgressStore::open(Box::new(NullBackend))
    }

    fn city(id: &str, province_id: &str) -> City {
        City {
            id: id.to_string(),
            name: id.to_string(),
            province_id: province_id.to_string(),
            x: 0.0,
            y: 0.0,
        }
    }

    fn province(id: &str, area_km2: f64, cities: Vec<City>) -> Province {
        Province {
            id: id.to_string(),
            name: id.to_string(),
            abbreviation: "甲",
            cities,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            area_km2,
        }
    }

    fn one_province_catalog() -> Catalog {
        Catalog::new(vec![province(
            "A",
            1000.0,
            vec![city("a1", "A"), city("a2", "A")],
        )])
    }

    #[test]
    fn two_city_scenario_reaches_tier_two() {
        let catalog = one_province_catalog();
        let mut store = empty_store();
        store.set("a1", TravelLevel::Visited);
        store.set("a2", TravelLevel::Lived);

        let stats = compute(&catalog, &store);
        assert_eq!(stats.score, 130);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.title, "初级探索者");
        assert_eq!(stats.province_count, 1);
        assert_eq!(stats.city_count, 2);
    }

    #[test]
    fn half_explored_province_contributes_half_its_area() {
        let catalog = one_province_catalog();
        let mut store = empty_store();
        store.set("a1", TravelLevel::Passed);

        let stats = compute(&catalog, &store);
        assert_eq!(stats.explored_area_km2, 500.0);
        assert!((stats.coverage_percent - 500.0 / TOTAL_LAND_AREA_KM2 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn score_never_decreases_when_a_level_rises() {
        let catalog = one_province_catalog();
        let mut store = empty_store();
        let mut previous = compute(&catalog, &store).score;
        for level in [TravelLevel::Passed, TravelLevel::Visited, TravelLevel::Lived] {
            store.set("a1", level);
            let score = compute(&catalog, &store).score;
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn clearing_a_region_zeroes_its_count() {
        let catalog = one_province_catalog();
        let mut store = empty_store();
        store.set_many([
            ("a1".to_string(), TravelLevel::Visited),
            ("a2".to_string(), TravelLevel::Lived),
        ]);
        assert_eq!(compute(&catalog, &store).province_count, 1);

        store.set_many([
            ("a1".to_string(), TravelLevel::Untouched),
            ("a2".to_string(), TravelLevel::Untouched),
        ]);
        let stats = compute(&catalog, &store);
        assert_eq!(stats.province_count, 0);
        assert_eq!(stats.city_count, 0);
        assert_eq!(stats.score, 0);
    }

    #[test]
    fn tier_thresholds_are_inclusive() {
        assert_eq!(tier_for(0), (1, "旅行新手"));
        assert_eq!(tier_for(99), (1, "旅行新手"));
        assert_eq!(tier_for(100), (2, "初级探索者"));
        assert_eq!(tier_for(500), (3, "进阶旅行家"));
        assert_eq!(tier_for(1500), (4, "资深向导"));
        assert_eq!(tier_for(3000), (5, "华夏通"));
        assert_eq!(tier_for(5000), (6, "传奇行者"));
        assert_eq!(tier_for(u32::MAX), (6, "传奇行者"));
    }

    #[test]
    fn ratio_is_floored_once_lit() {
        let catalog = Catalog::new(vec![province(
            "B",
            100.0,
            (0..20).map(|i| city(&format!("b{i}"), "B")).collect(),
        )]);
        let mut store = empty_store();
        let p = &catalog.provinces()[0];
        assert_eq!(province_ratio(p, &store), 0.0);

        store.set("b0", TravelLevel::Passed);
        // 1/60 would be below the floor.
        assert_eq!(province_ratio(p, &store), 0.1);
    }
}

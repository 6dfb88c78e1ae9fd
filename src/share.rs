//! Snapshot export: writes the current progress picture to a JSON file in
//! the user's home directory. This is the whole share mechanism; failures
//! are logged by the caller and never touch the progress store.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::ShareError;
use crate::level::TravelLevel;
use crate::stats::{self, DerivedStats};
use crate::store::ProgressStore;

const EXPORT_FILE: &str = "ChinaSteps-Share.json";

#[derive(Serialize)]
struct Snapshot<'a> {
    exported_at: String,
    level: u8,
    title: &'a str,
    score: u32,
    provinces_visited: usize,
    cities_visited: usize,
    total_cities: usize,
    explored_area_wan_km2: f64,
    coverage_percent: f64,
    provinces: Vec<ProvinceSnapshot>,
}

#[derive(Serialize)]
struct ProvinceSnapshot {
    name: String,
    lit: usize,
    total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cities: Vec<CitySnapshot>,
}

#[derive(Serialize)]
struct CitySnapshot {
    name: String,
    level: u8,
    label: &'static str,
}

pub fn export_snapshot(
    catalog: &Catalog,
    progress: &ProgressStore,
    stats: &DerivedStats,
) -> Result<PathBuf, ShareError> {
    let provinces = catalog
        .provinces()
        .iter()
        .map(|province| ProvinceSnapshot {
            name: province.name.clone(),
            lit: stats::province_hits(province, progress),
            total: province.cities.len(),
            cities: province
                .cities
                .iter()
                .filter_map(|city| {
                    let level = progress.get(&city.id);
                    (level > TravelLevel::Untouched).then(|| CitySnapshot {
                        name: city.name.clone(),
                        level: level.ordinal(),
                        label: level.label(),
                    })
                })
                .collect(),
        })
        .collect();

    let snapshot = Snapshot {
        exported_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        level: stats.level,
        title: stats.title,
        score: stats.score,
        provinces_visited: stats.province_count,
        cities_visited: stats.city_count,
        total_cities: catalog.total_cities(),
        explored_area_wan_km2: stats.explored_area_wan_km2(),
        coverage_percent: stats.coverage_percent,
        provinces,
    };

    let home = dirs::home_dir().ok_or(ShareError::NoHome)?;
    let path = home.join(EXPORT_FILE);
    let payload = serde_json::to_string_pretty(&snapshot)?;
    fs::write(&path, payload).map_err(|source| ShareError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

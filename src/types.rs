use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::metrics::log_scale;

/// Years covered by the dashboard, in ascending order.
pub const YEARS: [&str; 10] = [
    "2015", "2016", "2017", "2018", "2019", "2020", "2021", "2022", "2023", "2024",
];

/// The closed set of PAPI dimensions. Scores for each are in [1, 10].
pub const PAPI_DIMENSIONS: [&str; 8] = [
    "Dimension 1: Participation",
    "Dimension 2: Transparency of Local Decision-making",
    "Dimension 3: Vertical Accountability",
    "Dimension 4: Control of Corruption in the Public Sector",
    "Dimension 5: Public Administrative Procedures",
    "Dimension 6: Public Service Delivery",
    "Dimension 7: Environmental Governance",
    "Dimension 8: E-Governance",
];

/// One FDI observation. `fdi` is in million USD and may be negative
/// (disinvestment) or absent when the source cell was blank or garbage.
#[derive(Debug, Clone)]
pub struct FdiRecord {
    pub province: String,
    pub year: String,
    pub fdi: Option<f64>,
}

/// One PAPI observation: per-dimension scores for a province and year.
///
/// `synthetic` marks records produced by the simulator fallback rather than
/// read from a `papi_<year>.json` file, so consumers can tell provenance.
#[derive(Debug, Clone)]
pub struct PapiRecord {
    pub province: String,
    pub year: String,
    pub scores: BTreeMap<String, f64>,
    pub synthetic: bool,
}

/// National FDI total for one year, summed over all province records.
#[derive(Debug, Clone, Serialize)]
pub struct NationalTotal {
    pub year: String,
    pub total_fdi: f64,
}

/// Minimal GeoJSON shape: only `properties.Name` is used as the join key
/// against province names in the FDI and PAPI tables.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    #[serde(rename = "Name")]
    pub name: Option<String>,
}

/// The dataset store: loaded once, read-only thereafter.
///
/// Normalization bases and national totals are precomputed here so the
/// derivation functions never rescan the full table per query. The store is
/// replaced wholesale on reload, so the caches need no invalidation.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub fdi: Vec<FdiRecord>,
    pub papi: Vec<PapiRecord>,
    /// Province names from the GeoJSON boundaries, in file order.
    pub provinces: Vec<String>,
    log_fdi_min: f64,
    log_fdi_max: f64,
    papi_ranges: BTreeMap<String, (f64, f64)>,
    national: Vec<NationalTotal>,
}

impl Datasets {
    pub fn new(fdi: Vec<FdiRecord>, papi: Vec<PapiRecord>, provinces: Vec<String>) -> Self {
        // Global log-FDI range over all province x year records. A record
        // with a missing or non-positive value contributes log-value 0, so
        // the range is never empty once any record exists.
        let mut log_min = f64::INFINITY;
        let mut log_max = f64::NEG_INFINITY;
        for r in &fdi {
            let lv = log_scale(r.fdi.unwrap_or(0.0));
            log_min = log_min.min(lv);
            log_max = log_max.max(lv);
        }
        if !log_min.is_finite() || !log_max.is_finite() {
            log_min = 0.0;
            log_max = 0.0;
        }

        // Per-dimension PAPI range across all years.
        let mut papi_ranges: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for r in &papi {
            for (dim, score) in &r.scores {
                let e = papi_ranges
                    .entry(dim.clone())
                    .or_insert((f64::INFINITY, f64::NEG_INFINITY));
                e.0 = e.0.min(*score);
                e.1 = e.1.max(*score);
            }
        }

        let national = national_totals_of(&fdi);

        Datasets {
            fdi,
            papi,
            provinces,
            log_fdi_min: log_min,
            log_fdi_max: log_max,
            papi_ranges,
            national,
        }
    }

    /// Global (min, max) of log-scaled FDI across all records and years.
    /// This fixed basis makes normalized FDI comparable across years.
    pub fn log_fdi_range(&self) -> (f64, f64) {
        (self.log_fdi_min, self.log_fdi_max)
    }

    /// (min, max) of a PAPI dimension across all years, or `None` if the
    /// dimension never appears in the data.
    pub fn papi_range(&self, dimension: &str) -> Option<(f64, f64)> {
        self.papi_ranges.get(dimension).copied()
    }

    /// National FDI totals per year, ascending. Independent of the selected
    /// year; the trend view only marks the selected year's point.
    pub fn national_totals(&self) -> &[NationalTotal] {
        &self.national
    }
}

/// Group all FDI records by year and sum, treating missing values as 0.
fn national_totals_of(fdi: &[FdiRecord]) -> Vec<NationalTotal> {
    let mut years: Vec<&str> = fdi.iter().map(|r| r.year.as_str()).collect();
    years.sort_unstable();
    years.dedup();
    years
        .into_iter()
        .map(|yr| {
            let total_fdi = fdi
                .iter()
                .filter(|r| r.year == yr)
                .map(|r| r.fdi.unwrap_or(0.0))
                .sum();
            NationalTotal {
                year: yr.to_string(),
                total_fdi,
            }
        })
        .collect()
}

/// One row of the choropleth export: everything the map needs to paint and
/// caption a province for the selected year.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChoroplethRow {
    #[serde(rename = "Province")]
    #[tabled(rename = "Province")]
    pub province: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "FDI")]
    #[tabled(rename = "FDI")]
    pub fdi: String,
    #[serde(rename = "Band")]
    #[tabled(rename = "Band")]
    pub band: String,
    #[serde(rename = "FillColor")]
    #[tabled(rename = "FillColor")]
    pub fill_color: String,
    #[serde(rename = "Change")]
    #[tabled(rename = "Change")]
    pub change: String,
}

/// One bar of a within-region breakdown, ranked by FDI descending.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionBreakdownRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Province")]
    #[tabled(rename = "Province")]
    pub province: String,
    #[serde(rename = "FDI")]
    #[tabled(rename = "FDI")]
    pub fdi: String,
}

/// One point of the national trend line; `Selected` marks the current year.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct NationalTrendRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "TotalFDI")]
    #[tabled(rename = "TotalFDI")]
    pub total_fdi: String,
    #[serde(rename = "Selected")]
    #[tabled(rename = "Selected")]
    pub selected: String,
}

/// Regression stats for one PAPI dimension against normalized FDI.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CorrelationRow {
    #[serde(rename = "Dimension")]
    #[tabled(rename = "Dimension")]
    pub dimension: String,
    #[serde(rename = "Provinces")]
    #[tabled(rename = "Provinces")]
    pub provinces: usize,
    #[serde(rename = "Slope")]
    #[tabled(rename = "Slope")]
    pub slope: String,
    #[serde(rename = "Intercept")]
    #[tabled(rename = "Intercept")]
    pub intercept: String,
    #[serde(rename = "RSquared")]
    #[tabled(rename = "RSquared")]
    pub r_squared: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub selected_year: String,
    pub fdi_records: usize,
    pub papi_records: usize,
    pub provinces: usize,
    pub national_total_fdi: f64,
    pub synthetic_papi_years: usize,
}

// Loading for the three static inputs: the FDI CSV, the province GeoJSON,
// and one PAPI JSON file per year.
//
// The FDI table and the GeoJSON are the critical path: a failure there
// aborts the load. A missing or unreadable PAPI file is not an error; the
// deterministic simulator substitutes for that year so every view stays
// populated, and the substituted records are tagged `synthetic`.
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;

use csv::ReaderBuilder;
use serde_json::Value;

use crate::regions;
use crate::types::{Datasets, FdiRecord, FeatureCollection, PapiRecord, PAPI_DIMENSIONS};
use crate::util::{parse_f64_safe, parse_i32_safe};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub fdi_rows: usize,
    pub dropped_rows: usize,
    pub papi_records: usize,
    pub simulated_years: usize,
    pub provinces: usize,
}

/// Load all three sources and assemble the dataset store. FDI or GeoJSON
/// failure propagates; PAPI failures are absorbed by the simulator.
pub fn load_all(
    fdi_path: &str,
    geojson_path: &str,
    papi_dir: &str,
    years: &[&str],
) -> Result<(Datasets, LoadReport), Box<dyn Error>> {
    let csv_text = fs::read_to_string(fdi_path)?;
    let (fdi, dropped_rows) = load_fdi(&csv_text)?;

    let geo_text = fs::read_to_string(geojson_path)?;
    let provinces = load_geojson(&geo_text)?;

    let (papi, simulated_years) = load_papi(papi_dir, years);

    let report = LoadReport {
        fdi_rows: fdi.len(),
        dropped_rows,
        papi_records: papi.len(),
        simulated_years,
        provinces: provinces.len(),
    };
    Ok((Datasets::new(fdi, papi, provinces), report))
}

/// Parse the FDI CSV. The first line is the header row; a body row that
/// does not split into exactly header-count fields is silently dropped
/// (returned as the drop count). Quoted fields are not part of the format.
pub fn load_fdi(csv_text: &str) -> Result<(Vec<FdiRecord>, usize), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = rdr.headers()?.clone();
    let idx = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| format!("missing required column: {}", name))
    };
    let province_idx = idx("Province")?;
    let year_idx = idx("Year")?;
    let fdi_idx = idx("FDI")?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in rdr.records() {
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        if row.len() != headers.len() {
            dropped += 1;
            continue;
        }
        records.push(FdiRecord {
            province: row[province_idx].to_string(),
            year: row[year_idx].trim().to_string(),
            fdi: parse_f64_safe(row.get(fdi_idx)),
        });
    }
    Ok((records, dropped))
}

/// Extract the province join keys (`properties.Name`) from the GeoJSON
/// boundary file. Features without a name are skipped.
pub fn load_geojson(json_text: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let collection: FeatureCollection = serde_json::from_str(json_text)?;
    Ok(collection
        .features
        .into_iter()
        .filter_map(|f| f.properties.name)
        .collect())
}

/// Load `papi_<year>.json` for each year, substituting simulated records
/// for years whose file is missing or unreadable. Returns the records plus
/// the number of years that fell back to simulation.
pub fn load_papi(dir: &str, years: &[&str]) -> (Vec<PapiRecord>, usize) {
    let mut records = Vec::new();
    let mut simulated_years = 0usize;
    for year in years {
        let path = format!("{}/papi_{}.json", dir, year);
        let loaded = fs::read_to_string(&path)
            .ok()
            .and_then(|text| parse_papi_year(&text));
        match loaded {
            Some(mut year_records) => records.append(&mut year_records),
            None => {
                simulated_years += 1;
                records.extend(simulate_papi(year));
            }
        }
    }
    // Keep only provinces known to the region index, as the real files can
    // carry aggregate rows (e.g. national averages) that are not provinces.
    records.retain(|r| regions::region_of(&r.province).is_some());
    (records, simulated_years)
}

/// Parse one year's PAPI file: an array of objects with `Province`, `Year`,
/// and one numeric key per dimension. Returns `None` on any shape mismatch
/// so the caller falls back to simulation.
fn parse_papi_year(text: &str) -> Option<Vec<PapiRecord>> {
    let entries: Vec<BTreeMap<String, Value>> = serde_json::from_str(text).ok()?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let province = entry.get("Province")?.as_str()?.to_string();
        let year = match entry.get("Year")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let mut scores = BTreeMap::new();
        for dim in PAPI_DIMENSIONS {
            if let Some(v) = entry.get(dim).and_then(Value::as_f64) {
                scores.insert(dim.to_string(), v);
            }
        }
        out.push(PapiRecord {
            province,
            year,
            scores,
            synthetic: false,
        });
    }
    Some(out)
}

/// Deterministic stand-in for a missing PAPI year: one record per province
/// with a score per dimension derived from a hash of the province name, the
/// province's leading byte, and the year offset from 2015. Scores are
/// clamped to [1, 10] and rounded to two decimals.
pub fn simulate_papi(year: &str) -> Vec<PapiRecord> {
    let year_effect = (parse_i32_safe(Some(year)).unwrap_or(2015) - 2015) as f64 * 0.1;
    regions::all_provinces()
        .into_iter()
        .map(|province| {
            let province_effect = (province.as_bytes()[0] % 3) as f64 - 1.0;
            let mut scores = BTreeMap::new();
            for (i, dim) in PAPI_DIMENSIONS.iter().enumerate() {
                let base = 5.0 + (hash_name(province, i) % 500) as f64 / 100.0;
                let score = (base + province_effect + year_effect).clamp(1.0, 10.0);
                scores.insert(dim.to_string(), (score * 100.0).round() / 100.0);
            }
            PapiRecord {
                province: province.to_string(),
                year: year.to_string(),
                scores,
                synthetic: true,
            }
        })
        .collect()
}

// djb2 over the province name, perturbed per dimension.
fn hash_name(name: &str, dimension: usize) -> u64 {
    let mut h: u64 = 5381;
    for b in name.bytes() {
        h = h.wrapping_mul(33).wrapping_add(b as u64);
    }
    h.wrapping_mul(33).wrapping_add(dimension as u64)
}

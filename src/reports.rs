// Aggregation layer: turns the dataset store plus the selected year into
// the tabular views the render adapters consume.
//
// Every view is rebuilt from scratch on each call; nothing derived is
// cached across year changes.
use std::cmp::Ordering;

use crate::metrics::{
    color_for_fdi, linear_regression, normalized_fdi, normalized_papi, percentage_change, r_squared,
    raw_fdi, Point,
};
use crate::regions;
use crate::types::{
    ChoroplethRow, CorrelationRow, Datasets, NationalTrendRow, RegionBreakdownRow, SummaryStats,
    PAPI_DIMENSIONS,
};
use crate::util::format_number;

/// Raw FDI per member province of a region, missing values as 0, sorted
/// descending. Only meaningful for within-region ranking. Empty when no
/// year is selected or the region is unknown.
pub fn region_breakdown(data: &Datasets, year: Option<&str>, region: &str) -> Vec<(String, f64)> {
    if year.is_none() {
        return Vec::new();
    }
    let mut rows: Vec<(String, f64)> = regions::provinces_of(region)
        .iter()
        .map(|p| (p.to_string(), raw_fdi(data, year, p).unwrap_or(0.0)))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    rows
}

/// Breakdown rows for all six regions, each block ranked descending.
pub fn regional_table(data: &Datasets, year: Option<&str>) -> Vec<RegionBreakdownRow> {
    let mut rows = Vec::new();
    for (region, _) in regions::REGIONS {
        for (province, fdi) in region_breakdown(data, year, region) {
            rows.push(RegionBreakdownRow {
                region: region.to_string(),
                province,
                fdi: format_number(fdi, 2),
            });
        }
    }
    rows
}

/// Per-province choropleth rows for every feature in the GeoJSON: region
/// membership, raw FDI, color band, and year-over-year change. Missing
/// values render as "N/A" so the consumer never sees a hole.
pub fn choropleth_table(data: &Datasets, year: Option<&str>) -> Vec<ChoroplethRow> {
    data.provinces
        .iter()
        .map(|province| {
            let fdi = raw_fdi(data, year, province);
            let band = color_for_fdi(fdi);
            let change = match percentage_change(data, year, province) {
                Some(pct) => format!("{:+.2}%", pct),
                None => "N/A".to_string(),
            };
            ChoroplethRow {
                province: province.clone(),
                region: regions::region_of(province).unwrap_or("-").to_string(),
                fdi: fdi.map_or_else(|| "N/A".to_string(), |v| format_number(v, 2)),
                band: band.key().to_string(),
                fill_color: band.color().to_string(),
                change,
            }
        })
        .collect()
}

/// National FDI trend, ascending by year, with the selected year marked.
pub fn national_trend(data: &Datasets, year: Option<&str>) -> Vec<NationalTrendRow> {
    data.national_totals()
        .iter()
        .map(|t| NationalTrendRow {
            year: t.year.clone(),
            total_fdi: format_number(t.total_fdi, 2),
            selected: if Some(t.year.as_str()) == year {
                "*".to_string()
            } else {
                String::new()
            },
        })
        .collect()
}

/// OLS fit of normalized FDI against each normalized PAPI dimension over
/// all provinces with both values present for the selected year.
pub fn correlation_table(data: &Datasets, year: Option<&str>) -> Vec<CorrelationRow> {
    PAPI_DIMENSIONS
        .iter()
        .map(|dim| {
            let points: Vec<Point> = regions::all_provinces()
                .into_iter()
                .filter_map(|province| {
                    let x = normalized_papi(data, year, province, dim)?;
                    let y = normalized_fdi(data, year, province)?;
                    Some(Point { x, y })
                })
                .collect();
            let fit = linear_regression(&points);
            let r2 = r_squared(&points, fit);
            CorrelationRow {
                dimension: dim.to_string(),
                provinces: points.len(),
                slope: format_number(fit.slope, 2),
                intercept: format_number(fit.intercept, 2),
                r_squared: format_number(r2, 2),
            }
        })
        .collect()
}

pub fn generate_summary(data: &Datasets, year: &str) -> SummaryStats {
    let national_total_fdi = data
        .national_totals()
        .iter()
        .find(|t| t.year == year)
        .map(|t| t.total_fdi)
        .unwrap_or(0.0);
    let synthetic_years: std::collections::HashSet<&str> = data
        .papi
        .iter()
        .filter(|r| r.synthetic)
        .map(|r| r.year.as_str())
        .collect();
    SummaryStats {
        selected_year: year.to_string(),
        fdi_records: data.fdi.len(),
        papi_records: data.papi.len(),
        provinces: data.provinces.len(),
        national_total_fdi,
        synthetic_papi_years: synthetic_years.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Datasets, FdiRecord};

    fn rec(province: &str, year: &str, fdi: Option<f64>) -> FdiRecord {
        FdiRecord {
            province: province.to_string(),
            year: year.to_string(),
            fdi,
        }
    }

    #[test]
    fn national_totals_group_and_sort_by_year() {
        let data = Datasets::new(
            vec![
                rec("P1", "2015", Some(100.0)),
                rec("P2", "2015", Some(50.0)),
                rec("P1", "2016", Some(-20.0)),
            ],
            Vec::new(),
            Vec::new(),
        );
        let totals = data.national_totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].year, "2015");
        assert_eq!(totals[0].total_fdi, 150.0);
        assert_eq!(totals[1].year, "2016");
        assert_eq!(totals[1].total_fdi, -20.0);
    }

    #[test]
    fn national_totals_treat_missing_as_zero() {
        let data = Datasets::new(
            vec![rec("P1", "2015", Some(10.0)), rec("P2", "2015", None)],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(data.national_totals()[0].total_fdi, 10.0);
    }

    #[test]
    fn region_breakdown_ranks_descending_with_zero_fill() {
        let data = Datasets::new(
            vec![
                rec("Kon Tum", "2020", Some(5.0)),
                rec("Gia Lai", "2020", Some(40.0)),
                rec("Dak Lak", "2020", Some(-3.0)),
            ],
            Vec::new(),
            Vec::new(),
        );
        let rows = region_breakdown(&data, Some("2020"), "Central Highlands");
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], ("Gia Lai".to_string(), 40.0));
        assert_eq!(rows[1], ("Kon Tum".to_string(), 5.0));
        // Provinces without a record fill with zero, above the negative one.
        assert_eq!(rows[4], ("Dak Lak".to_string(), -3.0));
    }

    #[test]
    fn region_breakdown_empty_without_year_or_region() {
        let data = Datasets::new(vec![rec("Kon Tum", "2020", Some(5.0))], Vec::new(), Vec::new());
        assert!(region_breakdown(&data, None, "Central Highlands").is_empty());
        assert!(region_breakdown(&data, Some("2020"), "Narnia").is_empty());
    }

    #[test]
    fn choropleth_marks_missing_data() {
        let data = Datasets::new(
            vec![rec("Ha Noi", "2020", Some(2500.0))],
            Vec::new(),
            vec!["Ha Noi".to_string(), "Da Nang".to_string()],
        );
        let rows = choropleth_table(&data, Some("2020"));
        assert_eq!(rows[0].band, "pos-2000-3000");
        assert_eq!(rows[0].region, "Red River Delta");
        assert_eq!(rows[1].fdi, "N/A");
        assert_eq!(rows[1].band, "no-data");
        assert_eq!(rows[1].change, "N/A");
    }

    #[test]
    fn national_trend_marks_selected_year() {
        let data = Datasets::new(
            vec![rec("P1", "2019", Some(1.0)), rec("P1", "2020", Some(2.0))],
            Vec::new(),
            Vec::new(),
        );
        let rows = national_trend(&data, Some("2020"));
        assert_eq!(rows[0].selected, "");
        assert_eq!(rows[1].selected, "*");
    }

    #[test]
    fn summary_counts_synthetic_years() {
        let mut papi = crate::loader::simulate_papi("2019");
        papi.extend(crate::loader::simulate_papi("2020"));
        let data = Datasets::new(vec![rec("P1", "2020", Some(9.0))], papi, Vec::new());
        let s = generate_summary(&data, "2020");
        assert_eq!(s.synthetic_papi_years, 2);
        assert_eq!(s.national_total_fdi, 9.0);
        assert_eq!(s.papi_records, 126);
    }
}

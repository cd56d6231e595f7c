// Metric derivation engine.
//
// Every function here is pure in `(datasets, selected_year)`: degenerate
// input yields `None`, `0`, or a default struct instead of an error, so
// values can flow straight into report rows without a failure path.
use crate::types::Datasets;
use crate::util::parse_i32_safe;

/// First dashboard year; percentage change is pinned to 0 there.
pub const FIRST_YEAR: &str = "2015";

/// Natural log for positive values; zero otherwise.
///
/// Negative FDI (disinvestment) and zero both collapse to log-value 0, so
/// they are indistinguishable in normalized and scatter views. The raw
/// color scale still separates them; see `color_for_fdi`.
pub fn log_scale(v: f64) -> f64 {
    if v > 0.0 {
        v.ln()
    } else {
        0.0
    }
}

/// First FDI record matching `(province, year)`, ignoring surrounding
/// whitespace in province names. At most one record exists per key; if the
/// source ever contains duplicates, first match wins.
fn find_fdi<'a>(
    data: &'a Datasets,
    year: Option<&str>,
    province: &str,
) -> Option<&'a crate::types::FdiRecord> {
    let year = year?;
    let wanted = province.trim();
    data.fdi
        .iter()
        .find(|r| r.province.trim() == wanted && r.year == year)
}

/// Raw FDI in million USD for the selected year, or `None` when no year is
/// selected, no record matches, or the record's value is missing.
pub fn raw_fdi(data: &Datasets, year: Option<&str>, province: &str) -> Option<f64> {
    find_fdi(data, year, province)?.fdi
}

/// Log-scaled FDI for the selected year. A record with a missing value
/// yields `Some(0.0)` (the log-zero collapse); no record yields `None`.
pub fn log_fdi(data: &Datasets, year: Option<&str>, province: &str) -> Option<f64> {
    let rec = find_fdi(data, year, province)?;
    Some(log_scale(rec.fdi.unwrap_or(0.0)))
}

/// Linear rescale of `value` from `[min, max]` onto `[0, 100]`.
/// A degenerate range maps everything to the midpoint 50.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        return 50.0;
    }
    ((value - min) / (max - min)) * 100.0
}

/// Log-FDI normalized against the global min/max over ALL records and
/// years, so a province's score is comparable across year selections.
pub fn normalized_fdi(data: &Datasets, year: Option<&str>, province: &str) -> Option<f64> {
    let lv = log_fdi(data, year, province)?;
    let (min, max) = data.log_fdi_range();
    Some(normalize(lv, min, max))
}

/// Year-over-year percentage change of raw FDI.
///
/// Both sides of the comparison use the raw value, so this is a true
/// percentage change of dollar FDI. Returns `Some(0.0)` for the first
/// dashboard year, and `None` when no year is selected, either side is
/// missing, or the previous value is exactly zero.
pub fn percentage_change(data: &Datasets, year: Option<&str>, province: &str) -> Option<f64> {
    let year = year?;
    if year == FIRST_YEAR {
        return Some(0.0);
    }
    let current = raw_fdi(data, Some(year), province)?;
    let prev_year = (parse_i32_safe(Some(year))? - 1).to_string();
    let previous = raw_fdi(data, Some(&prev_year), province)?;
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

/// Discrete classification of a raw FDI value for the choropleth.
///
/// Variant order is ascending band order, so deriving `Ord` gives the
/// monotonicity the legend relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorBand {
    NoData,
    NegExtreme,
    NegHigh,
    NegMid,
    NegLow,
    NearZero,
    Pos1To10,
    Pos10To50,
    Pos50To100,
    Pos100To200,
    Pos200To500,
    Pos500To1000,
    Pos1000To2000,
    Pos2000To3000,
    PosExtreme,
}

impl ColorBand {
    /// Stable key for exports and style lookups.
    pub fn key(self) -> &'static str {
        match self {
            ColorBand::NoData => "no-data",
            ColorBand::NegExtreme => "neg-extreme",
            ColorBand::NegHigh => "neg-high",
            ColorBand::NegMid => "neg-mid",
            ColorBand::NegLow => "neg-low",
            ColorBand::NearZero => "near-zero",
            ColorBand::Pos1To10 => "pos-1-10",
            ColorBand::Pos10To50 => "pos-10-50",
            ColorBand::Pos50To100 => "pos-50-100",
            ColorBand::Pos100To200 => "pos-100-200",
            ColorBand::Pos200To500 => "pos-200-500",
            ColorBand::Pos500To1000 => "pos-500-1000",
            ColorBand::Pos1000To2000 => "pos-1000-2000",
            ColorBand::Pos2000To3000 => "pos-2000-3000",
            ColorBand::PosExtreme => "pos-extreme",
        }
    }

    /// Legend fill color.
    pub fn color(self) -> &'static str {
        match self {
            ColorBand::NoData => "#ffcccc",
            ColorBand::NegExtreme => "#990000",
            ColorBand::NegHigh => "#cc0000",
            ColorBand::NegMid => "#ff0000",
            ColorBand::NegLow => "#ff6666",
            ColorBand::NearZero => "#ffe6e6",
            ColorBand::Pos1To10 => "#e6ffe6",
            ColorBand::Pos10To50 => "#b3ffb3",
            ColorBand::Pos50To100 => "#66ff66",
            ColorBand::Pos100To200 => "#00ee00",
            ColorBand::Pos200To500 => "#00cc00",
            ColorBand::Pos500To1000 => "#00aa00",
            ColorBand::Pos1000To2000 => "#008800",
            ColorBand::Pos2000To3000 => "#006600",
            ColorBand::PosExtreme => "#004d00",
        }
    }
}

/// Band for a raw FDI value. All comparisons are strict, so a value sitting
/// exactly on a positive threshold falls into the lower band (10 is
/// `Pos1To10`, 3000 is `Pos2000To3000`).
pub fn color_for_fdi(fdi: Option<f64>) -> ColorBand {
    let v = match fdi {
        Some(v) if !v.is_nan() => v,
        _ => return ColorBand::NoData,
    };
    if v < 0.0 {
        return if v < -100.0 {
            ColorBand::NegExtreme
        } else if v < -50.0 {
            ColorBand::NegHigh
        } else if v < -10.0 {
            ColorBand::NegMid
        } else {
            ColorBand::NegLow
        };
    }
    if v < 1.0 {
        return ColorBand::NearZero;
    }
    if v > 3000.0 {
        ColorBand::PosExtreme
    } else if v > 2000.0 {
        ColorBand::Pos2000To3000
    } else if v > 1000.0 {
        ColorBand::Pos1000To2000
    } else if v > 500.0 {
        ColorBand::Pos500To1000
    } else if v > 200.0 {
        ColorBand::Pos200To500
    } else if v > 100.0 {
        ColorBand::Pos100To200
    } else if v > 50.0 {
        ColorBand::Pos50To100
    } else if v > 10.0 {
        ColorBand::Pos10To50
    } else {
        ColorBand::Pos1To10
    }
}

/// Raw PAPI score of one dimension for the selected year.
pub fn papi_score(
    data: &Datasets,
    year: Option<&str>,
    province: &str,
    dimension: &str,
) -> Option<f64> {
    let year = year?;
    let wanted = province.trim();
    let rec = data
        .papi
        .iter()
        .find(|r| r.province.trim() == wanted && r.year == year)?;
    rec.scores.get(dimension).copied()
}

/// PAPI score normalized against the dimension's min/max across all years.
pub fn normalized_papi(
    data: &Datasets,
    year: Option<&str>,
    province: &str,
    dimension: &str,
) -> Option<f64> {
    let score = papi_score(data, year, province, dimension)?;
    let (min, max) = data.papi_range(dimension)?;
    Some(normalize(score, min, max))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

/// Ordinary least squares over the finite points. Fewer than two usable
/// points, or zero variance in x, yields the `{0, 0}` default.
pub fn linear_regression(points: &[Point]) -> Regression {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut n = 0usize;
    for p in points {
        if p.x.is_nan() || p.y.is_nan() {
            continue;
        }
        sum_x += p.x;
        sum_y += p.y;
        sum_xy += p.x * p.y;
        sum_xx += p.x * p.x;
        n += 1;
    }
    if n < 2 {
        return Regression::default();
    }
    let n = n as f64;
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return Regression::default();
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Regression { slope, intercept }
}

/// Coefficient of determination for a fitted line. Returns 1 when all y
/// values are equal (SStot of zero would otherwise divide to NaN), and 0
/// for fewer than two points.
pub fn r_squared(points: &[Point], fit: Regression) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let mean_y = crate::util::average(&ys);
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for p in points {
        let pred = fit.slope * p.x + fit.intercept;
        ss_res += (p.y - pred).powi(2);
        ss_tot += (p.y - mean_y).powi(2);
    }
    if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
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

    fn store(fdi: Vec<FdiRecord>) -> Datasets {
        Datasets::new(fdi, Vec::new(), Vec::new())
    }

    #[test]
    fn raw_fdi_needs_a_selected_year() {
        let data = store(vec![rec("Ha Noi", "2020", Some(100.0))]);
        assert_eq!(raw_fdi(&data, None, "Ha Noi"), None);
        assert_eq!(raw_fdi(&data, Some("2020"), "Ha Noi"), Some(100.0));
        assert_eq!(raw_fdi(&data, Some("2021"), "Ha Noi"), None);
    }

    #[test]
    fn province_lookup_trims_whitespace() {
        let data = store(vec![rec(" Ha Noi ", "2020", Some(7.0))]);
        assert_eq!(raw_fdi(&data, Some("2020"), "Ha Noi"), Some(7.0));
        assert_eq!(raw_fdi(&data, Some("2020"), "  Ha Noi"), Some(7.0));
    }

    #[test]
    fn normalize_bounds_and_degenerate_range() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 50.0);
        assert_eq!(normalize(0.0, 0.0, 10.0), 0.0);
        assert_eq!(normalize(10.0, 0.0, 10.0), 100.0);
        assert_eq!(normalize(3.0, 3.0, 3.0), 50.0);
        assert_eq!(normalize(123.0, -4.5, -4.5), 50.0);
    }

    #[test]
    fn log_zero_collapse() {
        // Negative and zero FDI both land on log-value 0, hence the same
        // normalized score, even though their color bands differ.
        let data = store(vec![
            rec("P1", "2020", Some(-30.0)),
            rec("P2", "2020", Some(0.0)),
            rec("P3", "2020", Some(100.0)),
        ]);
        assert_eq!(log_fdi(&data, Some("2020"), "P1"), Some(0.0));
        assert_eq!(log_fdi(&data, Some("2020"), "P2"), Some(0.0));
        assert_eq!(
            normalized_fdi(&data, Some("2020"), "P1"),
            normalized_fdi(&data, Some("2020"), "P2")
        );
        assert_ne!(
            color_for_fdi(Some(-30.0)),
            color_for_fdi(Some(0.0))
        );
    }

    #[test]
    fn normalized_fdi_uses_global_basis() {
        // The record from another year stretches the global range, so the
        // 2020 maximum does not normalize to 100.
        let data = store(vec![
            rec("P1", "2020", Some(1.0)),
            rec("P2", "2020", Some(100.0)),
            rec("P1", "2021", Some(10000.0)),
        ]);
        let p2 = normalized_fdi(&data, Some("2020"), "P2").unwrap();
        assert!(p2 > 0.0 && p2 < 100.0);
        let top = normalized_fdi(&data, Some("2021"), "P1").unwrap();
        assert!((top - 100.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_change_first_year_is_zero() {
        let data = store(vec![rec("P1", "2015", Some(50.0))]);
        assert_eq!(percentage_change(&data, Some("2015"), "P1"), Some(0.0));
    }

    #[test]
    fn percentage_change_guards_zero_previous() {
        let data = store(vec![
            rec("P1", "2019", Some(0.0)),
            rec("P1", "2020", Some(80.0)),
        ]);
        assert_eq!(percentage_change(&data, Some("2020"), "P1"), None);
    }

    #[test]
    fn percentage_change_raw_basis() {
        let data = store(vec![
            rec("P1", "2019", Some(-50.0)),
            rec("P1", "2020", Some(25.0)),
        ]);
        // (25 - (-50)) / 50 * 100
        assert_eq!(percentage_change(&data, Some("2020"), "P1"), Some(150.0));
    }

    #[test]
    fn percentage_change_missing_sides() {
        let data = store(vec![rec("P1", "2020", Some(80.0))]);
        assert_eq!(percentage_change(&data, Some("2020"), "P1"), None);
        assert_eq!(percentage_change(&data, None, "P1"), None);
    }

    #[test]
    fn color_bands_cover_the_scale() {
        assert_eq!(color_for_fdi(None), ColorBand::NoData);
        assert_eq!(color_for_fdi(Some(f64::NAN)), ColorBand::NoData);
        assert_eq!(color_for_fdi(Some(-150.0)), ColorBand::NegExtreme);
        assert_eq!(color_for_fdi(Some(-60.0)), ColorBand::NegHigh);
        assert_eq!(color_for_fdi(Some(-30.0)), ColorBand::NegMid);
        assert_eq!(color_for_fdi(Some(-0.5)), ColorBand::NegLow);
        assert_eq!(color_for_fdi(Some(0.0)), ColorBand::NearZero);
        assert_eq!(color_for_fdi(Some(0.9)), ColorBand::NearZero);
        assert_eq!(color_for_fdi(Some(1.0)), ColorBand::Pos1To10);
        // Exact thresholds fall into the lower band.
        assert_eq!(color_for_fdi(Some(10.0)), ColorBand::Pos1To10);
        assert_eq!(color_for_fdi(Some(10.1)), ColorBand::Pos10To50);
        assert_eq!(color_for_fdi(Some(3000.0)), ColorBand::Pos2000To3000);
        assert_eq!(color_for_fdi(Some(3000.1)), ColorBand::PosExtreme);
    }

    #[test]
    fn color_bands_monotonic_over_positive_values() {
        let samples = [
            0.5, 1.0, 2.0, 10.0, 11.0, 49.0, 55.0, 100.0, 150.0, 250.0, 600.0, 1500.0, 2500.0,
            3500.0,
        ];
        for pair in samples.windows(2) {
            assert!(color_for_fdi(Some(pair[0])) <= color_for_fdi(Some(pair[1])));
        }
    }

    #[test]
    fn regression_degenerate_inputs() {
        assert_eq!(linear_regression(&[]), Regression::default());
        assert_eq!(
            linear_regression(&[Point { x: 1.0, y: 1.0 }]),
            Regression::default()
        );
        // No variance in x.
        assert_eq!(
            linear_regression(&[Point { x: 2.0, y: 1.0 }, Point { x: 2.0, y: 9.0 }]),
            Regression::default()
        );
    }

    #[test]
    fn regression_fits_a_line() {
        let points = [
            Point { x: 0.0, y: 0.0 },
            Point { x: 1.0, y: 2.0 },
            Point { x: 2.0, y: 4.0 },
        ];
        let fit = linear_regression(&points);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!(fit.intercept.abs() < 1e-9);
        assert!((r_squared(&points, fit) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn r_squared_constant_y_is_one() {
        let points = [
            Point { x: 0.0, y: 3.0 },
            Point { x: 1.0, y: 3.0 },
            Point { x: 2.0, y: 3.0 },
        ];
        let fit = linear_regression(&points);
        assert_eq!(r_squared(&points, fit), 1.0);
    }
}

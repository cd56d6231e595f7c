// Entry point and high-level CLI flow.
//
// The dashboard core is exercised through a small menu:
// - Option [1] loads the FDI CSV, the province boundaries, and the PAPI
//   files (simulating missing PAPI years), printing diagnostics.
// - Option [2] changes the selected year.
// - Option [3] regenerates every dashboard view for the selected year and
//   exports CSV tables plus a JSON summary.
mod loader;
mod metrics;
mod output;
mod regions;
mod reports;
mod selection;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

use selection::SelectionController;
use types::{Datasets, YEARS};

const FDI_CSV_PATH: &str = "data/extracted_data.csv";
const GEOJSON_PATH: &str = "data/Vietnam_provinces.geojson";
const PAPI_DIR: &str = "data";
const DEFAULT_YEAR: &str = "2023";

// Simple in-memory app state so we only load the files once but can change
// the year and regenerate reports multiple times in a single run. The
// derivation functions never touch this global; they take the datasets and
// the year as parameters.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        selection: SelectionController::new(),
    })
});

struct AppState {
    data: Option<Datasets>,
    selection: SelectionController,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt. The prompt is reused for the main menu and the year input.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load all three data sources.
///
/// The FDI table and the boundaries are the critical path: on failure the
/// error is reported and the state is left untouched. Missing PAPI years
/// were already absorbed by the simulator inside the loader.
fn handle_load() {
    match loader::load_all(FDI_CSV_PATH, GEOJSON_PATH, PAPI_DIR, &YEARS) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} FDI rows, {} provinces, {} PAPI records)",
                util::format_int(report.fdi_rows as i64),
                util::format_int(report.provinces as i64),
                util::format_int(report.papi_records as i64)
            );
            if report.dropped_rows > 0 {
                println!(
                    "Note: {} malformed CSV rows dropped.",
                    util::format_int(report.dropped_rows as i64)
                );
            }
            if report.simulated_years > 0 {
                println!(
                    "Info: simulated PAPI data substituted for {} year(s).",
                    util::format_int(report.simulated_years as i64)
                );
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
            if let Err(e) = state.selection.initialize(DEFAULT_YEAR) {
                eprintln!("{}", e);
            }
        }
        Err(e) => {
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

/// Handle option [2]: change the selected year.
fn handle_select_year() {
    println!(
        "Available years: {} to {}",
        YEARS[0],
        YEARS[YEARS.len() - 1]
    );
    let year = read_choice();
    let mut state = APP_STATE.lock().unwrap();
    match state.selection.set_year(&year) {
        Ok(()) => println!("Selected year set to {}.\n", year),
        Err(e) => println!("{}\n", e),
    }
}

/// Handle option [3]: rebuild every view for the selected year and export.
///
/// This function is intentionally side-effectful:
/// - writes four CSV files,
/// - writes a JSON summary,
/// - and prints markdown previews of each table to the console.
fn handle_generate_reports() {
    let (data, year) = {
        let state = APP_STATE.lock().unwrap();
        (state.data.clone(), state.selection.year().map(String::from))
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the data files first (option 1).\n");
        return;
    };
    let Some(year) = year else {
        println!("Error: No year selected.\n");
        return;
    };

    println!("Generating dashboard views for {}...", year);
    println!("Outputs saved to individual files...\n");

    let choropleth = reports::choropleth_table(&data, Some(&year));
    let file1 = "choropleth_map.csv";
    if let Err(e) = output::write_csv(file1, &choropleth) {
        eprintln!("Write error: {}", e);
    }
    println!("View 1: Provincial FDI Choropleth ({})", year);
    output::preview_table_rows(&choropleth, 5);
    println!("(Full table exported to {})\n", file1);

    let regional = reports::regional_table(&data, Some(&year));
    let file2 = "regional_breakdown.csv";
    if let Err(e) = output::write_csv(file2, &regional) {
        eprintln!("Write error: {}", e);
    }
    println!("View 2: Regional FDI Breakdown (ranked within region)");
    output::preview_table_rows(&regional, 5);
    println!("(Full table exported to {})\n", file2);

    let trend = reports::national_trend(&data, Some(&year));
    let file3 = "national_trend.csv";
    if let Err(e) = output::write_csv(file3, &trend) {
        eprintln!("Write error: {}", e);
    }
    println!("View 3: National FDI Trend (selected year marked)");
    output::preview_table_rows(&trend, 10);
    println!("(Full table exported to {})\n", file3);

    let correlation = reports::correlation_table(&data, Some(&year));
    let file4 = "papi_correlation.csv";
    if let Err(e) = output::write_csv(file4, &correlation) {
        eprintln!("Write error: {}", e);
    }
    println!("View 4: PAPI vs FDI Correlation by Dimension");
    output::preview_table_rows(&correlation, 8);
    println!("(Full table exported to {})\n", file4);

    let summary = reports::generate_summary(&data, &year);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"selected_year\": \"{}\", \"national_total_fdi\": {}}}\n",
        summary.selected_year,
        util::format_number(summary.national_total_fdi, 2)
    );
}

fn main() {
    loop {
        println!("Vietnam FDI / PAPI Dashboard");
        println!("[1] Load the data files");
        println!("[2] Select year ({}-{})", YEARS[0], YEARS[YEARS.len() - 1]);
        println!("[3] Generate dashboard reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                handle_select_year();
            }
            "3" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}

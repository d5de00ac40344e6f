// Entry point and high-level CLI flow.
//
// The binary replaces the reactive dashboard scripts with an explicit menu
// loop: pick an outlet (or all outlets), and the current view is filtered,
// aggregated and rendered from scratch. Only the combined dataset itself is
// cached; [R] invalidates it and forces a re-read of the source files.
mod catalog;
mod feedback;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use catalog::{AppConfig, OutletCatalog, ReportOptions, Selection};
use loader::DatasetCache;
use once_cell::sync::Lazy;
use std::io::{self, Write};

const CONFIG_FILE: &str = "dashboard_config.json";
const FEEDBACK_FILE: &str = "feedback_submissions.csv";

// The combined dataset is loaded on first use and shared for the rest of
// the process; every menu interaction recomputes its view from this cache.
static DATASET: Lazy<DatasetCache> = Lazy::new(DatasetCache::new);

/// Read a single line of input after printing a prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn print_menu(catalog: &OutletCatalog) {
    println!("Outlet Return Analysis Dashboard");
    println!("[0] All outlets");
    for (idx, name) in catalog.names().enumerate() {
        println!("[{}] {}", idx + 1, name);
    }
    println!("[F] Submit customer feedback");
    println!("[R] Reload source files");
    println!("[Q] Quit\n");
}

/// Map a menu choice to a selection; `None` means the choice was not an
/// outlet (handled elsewhere or invalid).
fn parse_selection(choice: &str, catalog: &OutletCatalog) -> Option<Selection> {
    let idx: usize = choice.parse().ok()?;
    if idx == 0 {
        return Some(Selection::All);
    }
    catalog
        .entries()
        .get(idx - 1)
        .map(|e| Selection::Outlet(e.name.clone()))
}

/// Filter, aggregate and render the view for one selection, exporting each
/// table alongside the console preview.
fn render_dashboard(catalog: &OutletCatalog, opts: ReportOptions, selection: &Selection) {
    let freshly_loaded = !DATASET.is_loaded();
    let dataset = match DATASET.get_or_load(catalog, opts.apply_abs) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to load outlet data: {}\n", e);
            return;
        }
    };
    let (data, load_report) = (&dataset.0, &dataset.1);

    if freshly_loaded {
        for w in &load_report.warnings {
            println!("Warning: {}", w);
        }
        println!(
            "Loaded {} rows from {} of {} outlet files.",
            util::format_int(load_report.total_rows as i64),
            util::format_int(load_report.files_loaded as i64),
            util::format_int(catalog.len() as i64)
        );
        if load_report.skipped_rows > 0 || load_report.coerced_values > 0 {
            println!(
                "Note: {} rows skipped, {} unparseable values coerced to zero.",
                util::format_int(load_report.skipped_rows as i64),
                util::format_int(load_report.coerced_values as i64)
            );
        }
        println!("");
    }

    let view = reports::filter_view(data, selection);
    println!("View: {} ({} rows)\n", selection, view.len());

    let totals = reports::scalar_totals(&view, opts.include_tax);
    println!(
        "Total Value (After Tax):  {}",
        util::format_number(totals.total_after_tax, 2)
    );
    println!(
        "Total Value (Before Tax): {}",
        util::format_number(totals.total_before_tax, 2)
    );
    if let Some(tax) = totals.total_tax {
        println!("Total Tax:                {}", util::format_number(tax, 2));
    }
    println!("");

    println!("Top {} Items by Value (After Tax)\n", opts.top_n);
    if opts.breakdown_by_outlet {
        let rows = reports::item_outlet_rows(&reports::item_outlet_breakdown(&view, opts.top_n));
        output::preview_table_rows(&rows, 20);
        if let Err(e) = output::write_csv("report_top_items_by_outlet.csv", &rows) {
            eprintln!("Write error: {}", e);
        }
        println!("(Full table exported to report_top_items_by_outlet.csv)\n");
    } else {
        let rows = reports::item_ranking_rows(&reports::rank_items(&view, opts.top_n));
        output::preview_table_rows(&rows, 10);
        if let Err(e) = output::write_csv("report_top_items.csv", &rows) {
            eprintln!("Write error: {}", e);
        }
        println!("(Full table exported to report_top_items.csv)\n");
    }

    if *selection == Selection::All {
        println!("Outlet-wise Summary (sorted by After Tax)\n");
        let rows = reports::outlet_summary_rows(&reports::outlet_totals(data));
        output::preview_table_rows(&rows, 20);
        if let Err(e) = output::write_csv("report_outlet_summary.csv", &rows) {
            eprintln!("Write error: {}", e);
        }
        println!("(Full table exported to report_outlet_summary.csv)\n");
    }

    println!("Detailed View\n");
    let detail = reports::detail_rows(&view);
    output::preview_table_rows(&detail, 5);
    if let Err(e) = output::write_csv("report_detail.csv", &detail) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "(Detailed view, {} rows, exported to report_detail.csv)",
        util::format_int(detail.len() as i64)
    );

    let summary = reports::generate_summary(&view, selection, opts.include_tax);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("(Summary stats exported to summary.json)\n");
}

/// Collect the feedback form fields and append one record to the store.
fn handle_feedback(catalog: &OutletCatalog) {
    println!("Customer Feedback");
    for (idx, name) in catalog.names().enumerate() {
        println!("[{}] {}", idx + 1, name);
    }
    let outlet = loop {
        let choice = read_line("Select your outlet: ");
        let parsed = choice
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| catalog.entries().get(i));
        match parsed {
            Some(entry) => break entry.name.clone(),
            None => println!("Invalid choice."),
        }
    };

    let name = read_line("Customer Name: ");
    let email = read_line("Email (optional): ");
    let rating = loop {
        let raw = read_line("Rate the outlet (1-5): ");
        match raw.parse::<u8>() {
            Ok(r) if (1..=5).contains(&r) => break r,
            _ => println!("Please enter a number from 1 to 5."),
        }
    };
    let text = read_line("Your Feedback: ");

    let record = match feedback::FeedbackRecord::new(&name, &email, rating, &outlet, &text) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Feedback not submitted: {}\n", e);
            return;
        }
    };
    match feedback::append_record(FEEDBACK_FILE, &record) {
        Ok(()) => println!("Feedback submitted for {}.\n", outlet),
        Err(feedback::FeedbackError::PermissionDenied { path }) => {
            eprintln!(
                "Permission denied writing to {}. Check that the feedback store is writable.\n",
                path
            );
        }
        Err(e) => eprintln!("Error submitting feedback: {}\n", e),
    }
}

fn main() {
    let config = match AppConfig::load(CONFIG_FILE) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error in {}: {}", CONFIG_FILE, e);
            return;
        }
    };
    let catalog = config.catalog();
    let opts = config.report;

    loop {
        print_menu(&catalog);
        let choice = read_line("Enter choice: ");
        match choice.to_uppercase().as_str() {
            "Q" => {
                println!("Exiting the program.");
                break;
            }
            "R" => {
                DATASET.invalidate();
                println!("Dataset cache cleared; files will be re-read on next view.\n");
            }
            "F" => {
                handle_feedback(&catalog);
            }
            other => match parse_selection(other, &catalog) {
                Some(selection) => {
                    println!("");
                    render_dashboard(&catalog, opts, &selection);
                }
                None => println!("Invalid choice.\n"),
            },
        }
    }
}

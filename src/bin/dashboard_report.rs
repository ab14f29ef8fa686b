//! Terminal rendering of the shipment dashboard
//!
//! Run: ./target/release/dashboard_report [--data PATH] [--state S]... [--no-states] [--json]

use anyhow::Result;
use clap::Parser;
use shipment_dashboard::charts::format_value;
use shipment_dashboard::dashboard::{Dashboard, FILTER_LABEL, METRICS_HEADING};
use shipment_dashboard::loader::load_csv;
use shipment_dashboard::{Selection, DEFAULT_DATA_PATH};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dashboard_report")]
#[command(about = "Print the shipment dashboard as a text report")]
struct Args {
    /// Flattened shipments CSV
    #[arg(long, env = "SHIPMENT_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Drop state to include (repeatable; default is every state)
    #[arg(long = "state")]
    states: Vec<String>,

    /// Select no states at all
    #[arg(long, conflicts_with = "states")]
    no_states: bool,

    /// Print the dashboard model as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn print_section_header(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(60));
}

fn bar(pct: f64) -> String {
    "#".repeat((pct / 2.0).max(0.0) as usize)
}

fn pct_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();

    let data = match load_csv(&args.data) {
        Ok(data) => data,
        Err(e) if e.is_missing_file() => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    info!("Loaded {} shipments", data.len());

    let selection = if args.no_states {
        Selection::from_states(Vec::<String>::new())
    } else if args.states.is_empty() {
        Selection::All
    } else {
        Selection::from_states(args.states)
    };

    let dashboard = Dashboard::build(&data, &selection);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    print_report(&dashboard);
    Ok(())
}

fn print_report(dashboard: &Dashboard) {
    println!("\n{}", "=".repeat(60));
    println!("         {}", dashboard.title);
    println!("{}", "=".repeat(60));

    println!(
        "\n{}: {}",
        FILTER_LABEL,
        if dashboard.selected_states.is_empty() {
            "(none)".to_string()
        } else {
            dashboard.selected_states.join(", ")
        }
    );
    println!(
        "Shipments: {} of {}",
        dashboard.filtered_shipments, dashboard.total_shipments
    );
    if dashboard.skipped_rows > 0 {
        println!("Skipped malformed rows: {}", dashboard.skipped_rows);
    }

    print_section_header(METRICS_HEADING);
    let m = &dashboard.metrics;
    println!("  Avg Days:         {:>8}", m.avg_days_display());
    println!("  Avg Attempts:     {:>8}", m.avg_attempts_display());
    println!("  Common Attempts:  {:>8}", m.common_attempts_display());

    let agg = &dashboard.aggregates;
    let attempts_total: usize = agg.attempts.iter().map(|b| b.count).sum();

    print_section_header("DELIVERY ATTEMPTS");
    for bucket in &agg.attempts {
        let pct = pct_of(bucket.count, attempts_total);
        println!(
            "  {:>4} attempts {:>8} ({:>5.1}%) {}",
            bucket.attempts,
            bucket.count,
            pct,
            bar(pct)
        );
    }

    print_section_header("% DELIVERIES BY STATE");
    for share in &agg.states {
        println!(
            "  {:20} {:>7}% {}",
            share.label,
            format_value(share.percent),
            bar(share.percent)
        );
    }

    print_section_header("DROP CITY SHARE");
    for share in &agg.cities {
        println!(
            "  {:20} {:>7}% {}",
            share.label,
            format_value(share.percent),
            bar(share.percent)
        );
    }

    print_section_header("PAYMENT TYPE");
    for count in &agg.payment_types {
        let pct = pct_of(count.count, dashboard.filtered_shipments);
        println!("  {:12} {:>8} ({:>5.1}%)", count.label, count.count, pct);
    }

    print_section_header("PAYMENT TYPE BY DROP CITY");
    println!("  {:20} {:12} {:>8}", "City", "Payment", "Count");
    println!("  {}", "-".repeat(42));
    for cell in &agg.city_payment {
        println!("  {:20} {:12} {:>8}", cell.city, cell.payment_type, cell.count);
    }

    println!("\n{}", "=".repeat(60));
    println!("{}", dashboard.caption);
    println!();
}

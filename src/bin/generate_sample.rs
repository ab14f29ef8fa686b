//! Sample data generator for the shipment dashboard
//!
//! Writes a flattened shipments CSV with the columns the dashboard reads,
//! so the server can be tried without running the real flatten step.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --rows <N>       Number of shipments to write (default: 500)
//!   --seed <N>       Random seed for reproducibility (optional)
//!   --output <PATH>  Output CSV path (default: output/flattened_shipments.csv)

use anyhow::{Context, Result};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use shipment_dashboard::models::CsvRecord;
use shipment_dashboard::DEFAULT_DATA_PATH;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate a sample flattened shipments CSV")]
struct Args {
    /// Number of shipments to generate
    #[arg(long, default_value = "500")]
    rows: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Share of cash-on-delivery shipments (0.0 - 1.0)
    #[arg(long, default_value = "0.55")]
    cod_rate: f64,

    /// Output CSV path
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    output: PathBuf,
}

/// (state, cities, relative volume)
const DESTINATIONS: &[(&str, &[&str], u32)] = &[
    ("Maharashtra", &["Mumbai", "Pune", "Nagpur"], 30),
    ("Karnataka", &["Bengaluru", "Mysuru"], 22),
    ("Delhi", &["New Delhi"], 18),
    ("Tamil Nadu", &["Chennai", "Coimbatore"], 14),
    ("West Bengal", &["Kolkata"], 9),
    ("Kerala", &["Kochi", "Thiruvananthapuram"], 7),
];

/// Attempt counts weighted towards first-time success.
const ATTEMPT_WEIGHTS: [(u32, u32); 4] = [(1, 70), (2, 20), (3, 8), (4, 2)];

fn pick_weighted<'a, T>(items: &'a [T], weight: impl Fn(&T) -> u32, rng: &mut impl Rng) -> &'a T {
    let total: u32 = items.iter().map(&weight).sum();
    let mut roll = rng.gen_range(0..total);
    for item in items {
        let w = weight(item);
        if roll < w {
            return item;
        }
        roll -= w;
    }
    &items[items.len() - 1]
}

fn generate_record(rng: &mut impl Rng, cod_rate: f64) -> CsvRecord {
    let (state, cities, _) = pick_weighted(DESTINATIONS, |d| d.2, rng);
    let city = cities[rng.gen_range(0..cities.len())];
    let (attempts, _) = *pick_weighted(&ATTEMPT_WEIGHTS, |a| a.1, rng);

    // Each failed attempt usually costs about a day.
    let base_days = rng.gen_range(1..=5) as f64;
    let days = base_days + (attempts - 1) as f64 * rng.gen_range(0.5..1.5);

    let payment_type = if rng.gen_bool(cod_rate) { "COD" } else { "Prepaid" };

    CsvRecord {
        drop_state: state.to_string(),
        drop_city: city.to_string(),
        payment_type: payment_type.to_string(),
        days_taken: Some(days.round()),
        delivery_attempts: Some(attempts as f64),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.cod_rate),
        "--cod-rate must be between 0.0 and 1.0"
    );
    anyhow::ensure!(args.rows > 0, "--rows must be at least 1");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)
        .with_context(|| format!("opening {}", args.output.display()))?;

    for _ in 0..args.rows {
        writer.serialize(generate_record(&mut rng, args.cod_rate))?;
    }
    writer.flush()?;

    info!("Wrote {} shipments to {:?}", args.rows, args.output);
    Ok(())
}

//! Forage quickstart: a small density sweep for every walk variant.
//!
//! Demonstrates:
//!   1. Building a SimConfig and a BatchRunner
//!   2. Running a parallel batch for each perturbation
//!   3. Summarising discovered sites per density
//!   4. Writing result files under `results/<variant>/`, if `results/` exists
//!
//! Run with:
//!   RUST_LOG=forage_engine=info cargo run --example quickstart

use std::path::Path;

use forage_engine::{BatchRunner, Perturbation, SimConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forage_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ─── Batch parameters ───────────────────────────────────────

    let base = SimConfig {
        n_sims: 20,
        dimension: 2,
        lattice_size: 1000.0,
        end_time: 2000.0,
        handling_time: 1.0,
        p_drift: 0.1,
        power_law_xmin: 1.0,
        power_law_xmax: 20.0,
        power_law_gamma: 2.0,
        p_perco: 0.05,
        densities: vec![400, 2_500, 10_000, 40_000],
        seed: 2024,
        ..SimConfig::default()
    };

    // ─── One batch per walk variant ─────────────────────────────

    for perturbation in Perturbation::ALL {
        let config = SimConfig {
            perturbation,
            ..base.clone()
        };
        let runner = BatchRunner::new(config.clone())?;
        let summary = runner.run()?;

        println!("\n{perturbation} walk ({} runs):", summary.len());
        for (density, mean) in summary.mean_discovered() {
            println!("  density {density:>6}: {mean:>8.1} sites found on average");
        }
        if let Some(peak) = summary.peak_capacity() {
            println!("  largest lattice: {peak} slots");
        }

        let results = Path::new("results");
        if results.is_dir() {
            let dir = results.join(perturbation.name());
            std::fs::create_dir_all(&dir)?;
            let path = summary.save(&dir, &config)?;
            println!("  wrote {}", path.display());
        }
    }

    println!("\nDone.");
    Ok(())
}

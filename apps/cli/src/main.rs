use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quakemap_core::{
    AnimationLayer, FeatureCollection, PipelineConfig, RunSummary, collection_to_json,
    format_summary_readable, layer_to_json, load_table, run_pipeline, save_collection, save_layer,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{:.1}s", secs)
    }
}

#[derive(Parser)]
#[command(name = "quakemap")]
#[command(
    about = "Turn a seismic event table into styled, time-tagged features for an animated map"
)]
struct Cli {
    /// Event table (.csv, or .json array of objects)
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file (overrides QUAKEMAP_CONFIG and the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit only the FeatureCollection, without playback options
    #[arg(long)]
    features_only: bool,

    /// Print a run summary to stderr
    #[arg(short, long)]
    summary: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting quakemap v{}", env!("CARGO_PKG_VERSION"));

    let config = match PipelineConfig::resolve(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let total_start = Instant::now();

    // Step 1: Read the event table
    let spinner = create_spinner("Reading event table...");
    let records = load_table(&cli.input).await?;
    spinner.finish_with_message(format!(
        "{} Read {} records from {}",
        style("✓").green().bold(),
        records.len(),
        style(cli.input.display()).dim()
    ));

    // Step 2: Normalize, classify and synthesize
    let step_start = Instant::now();
    let spinner = create_spinner("Building features...");
    let output = match run_pipeline(&records, &config) {
        Ok(output) => output,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    spinner.finish_with_message(format!(
        "{} Built {} features for {} events {}",
        style("✓").green().bold(),
        output.features.len(),
        output.records.len(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    let summary = RunSummary::from_output(&output);

    // Step 3: Write the layer
    match (&cli.output, cli.features_only) {
        (Some(path), true) => save_collection(&FeatureCollection::new(output.features), path).await?,
        (Some(path), false) => {
            save_layer(&AnimationLayer::new(output.features, config.playback), path).await?
        }
        (None, true) => println!(
            "{}",
            collection_to_json(&FeatureCollection::new(output.features))?
        ),
        (None, false) => println!(
            "{}",
            layer_to_json(&AnimationLayer::new(output.features, config.playback))?
        ),
    }

    if let Some(path) = &cli.output {
        eprintln!(
            "\n{} {}",
            style("Saved:").dim(),
            style(path.display()).cyan()
        );
    }

    if cli.summary {
        eprintln!("{}", style("─".repeat(60)).dim());
        eprint!("{}", format_summary_readable(&summary));
    }

    eprintln!(
        "{} {}",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use gcodetrace::{init_logging, run_job, Config, Units, WorkerMessage};
use gcodetrace_core::units::{format_duration, format_length};
use gcodetrace_visualizer::worker::{GeometryInfo, ParsedData};
use tracing::{debug, info, warn};

/// Interpret a G-code program and report its toolpath statistics
#[derive(Debug, Parser)]
#[command(name = "gcodetrace", version = LONG_VERSION, about)]
struct Cli {
    /// G-code program to interpret
    file: PathBuf,

    /// Configuration file (.toml or .json); defaults to the user config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat the program as a laser job
    #[arg(long)]
    laser: bool,

    /// Activate tools on the T word without waiting for M6
    #[arg(long)]
    atc: bool,

    /// Lift toolpaths by the `Cylinder Dia:` stock radius
    #[arg(long)]
    rotary_offset: bool,

    /// Print the SVG outline path
    #[arg(long)]
    svg: bool,

    /// Report lengths in inches
    #[arg(long)]
    imperial: bool,

    /// Print the metadata message as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Write log events as JSON lines
    #[arg(long)]
    json_logs: bool,
}

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load user config")?,
    };
    config.visualizer.laser_mode |= cli.laser;
    config.visualizer.atc_enabled |= cli.atc;
    config.visualizer.rotary_diameter_offset_enabled |= cli.rotary_offset;
    config.visualizer.include_svg |= cli.svg;
    Ok(config)
}

fn print_summary(info: &GeometryInfo, data: &ParsedData, units: Units) {
    let stats = &data.info;
    let est = &data.estimates;

    println!("Lines:          {}", stats.total_lines);
    println!(
        "Motion events:  {} (rapid {}, linear {}, arc {}, rotary {})",
        stats.total_segments,
        stats.counts.rapid,
        stats.counts.linear,
        stats.counts.arc,
        stats.counts.curve
    );
    println!("Rapid travel:   {}", format_length(est.rapid_distance, units));
    println!("Feed travel:    {}", format_length(est.feed_distance, units));
    println!("  of which arcs {}", format_length(est.arc_distance, units));
    println!("Estimated time: {}", format_duration(est.total_time));
    if est.dwell_time > 0.0 {
        println!("  dwell         {}", format_duration(est.dwell_time));
    }

    if let Some(b) = &info.bounds {
        println!(
            "Cut extent:     X {} .. {}  Y {} .. {}  Z {} .. {}",
            format_length(b.min_x, units),
            format_length(b.max_x, units),
            format_length(b.min_y, units),
            format_length(b.max_y, units),
            format_length(b.min_z, units),
            format_length(b.max_z, units)
        );
    }

    for change in &stats.tool_changes {
        println!(
            "Tool change:    T{} at line {} (event {})",
            change.tool, change.line_number, change.event_index
        );
    }
    for invalid in &data.invalid_lines {
        let reasons: Vec<String> = invalid.errors.iter().map(ToString::to_string).collect();
        println!(
            "Invalid line {}: {} [{}]",
            invalid.line_number,
            invalid.content,
            reasons.join("; ")
        );
    }

    if let Some(svg) = &info.svg {
        println!("SVG path:       {}", svg);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    let content = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let config = load_config(&cli)?;
    info!("Interpreting {}", cli.file.display());

    let mut geometry = None;
    let mut metadata = None;
    run_job(config.job_request(content, 1), |message| match message {
        WorkerMessage::Progress { progress, .. } => debug!("Progress {}%", progress),
        WorkerMessage::GeometryReady { info, .. } => geometry = Some(info),
        metadata_message @ WorkerMessage::MetadataReady { .. } => metadata = Some(metadata_message),
        WorkerMessage::Parsed { .. } => warn!("Unexpected combined result message"),
    });

    let (Some(info), Some(metadata)) = (geometry, metadata) else {
        bail!("Job finished without results");
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&metadata).context("Failed to encode metadata")?;
        println!("{}", json);
        return Ok(());
    }

    if let WorkerMessage::MetadataReady { parsed_data, .. } = &metadata {
        let units = if cli.imperial { Units::INCH } else { Units::MM };
        print_summary(&info, parsed_data, units);
        if !parsed_data.invalid_lines.is_empty() {
            warn!("{} invalid lines", parsed_data.invalid_lines.len());
        }
    }

    Ok(())
}

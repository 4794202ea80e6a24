//! layout-diff - Screenshot layout regression checker
//!
//! Entry point for the CLI binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use layout_diff::analysis;
use layout_diff::config::Config;
use layout_diff::crop::{self, CropRect};
use layout_diff::raster;
use layout_diff::report;

/// Version string with build metadata
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// Command-line arguments for layout-diff
#[derive(Parser, Debug)]
#[command(name = "layout-diff")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Screenshot layout regression checker", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(short, long, env = "LAYOUT_DIFF_CONFIG", default_value = "layout-diff.toml")]
    config: String,

    /// Per-channel difference threshold override
    #[arg(short, long, env = "LAYOUT_DIFF_THRESHOLD")]
    threshold: Option<u8>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two screenshots pixel-by-pixel
    Compare {
        /// Baseline screenshot
        image1: PathBuf,

        /// Screenshot to compare against the baseline
        image2: PathBuf,

        /// Where to save the red-highlight visual diff
        diff_output: Option<PathBuf>,

        /// Write the comparison as a JSON report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Analyze how differences distribute across the page layout
    Layout {
        /// Baseline screenshot
        image1: PathBuf,

        /// Screenshot to compare against the baseline
        image2: PathBuf,
    },

    /// Crop a section out of a screenshot
    Crop {
        /// Source screenshot
        input: PathBuf,

        /// Where to save the cropped section
        output: PathBuf,

        /// First row to keep
        #[arg(long, default_value_t = 0)]
        top: u32,

        /// One past the last row to keep (defaults to the image height)
        #[arg(long)]
        bottom: Option<u32>,

        /// First column to keep
        #[arg(long, default_value_t = 0)]
        left: u32,

        /// One past the last column to keep (defaults to the image width)
        #[arg(long)]
        right: Option<u32>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;
    debug!("layout-diff v{}", LONG_VERSION);

    let config = Config::load(&args.config).unwrap_or_else(|e| {
        debug!("No config loaded ({:#}), using defaults", e);
        Config::default_config()
    });
    let config = config.with_overrides(args.threshold);
    debug!("Config: {:?}", config);

    match &args.command {
        Command::Compare {
            image1,
            image2,
            diff_output,
            report,
        } => run_compare(
            &config,
            image1,
            image2,
            diff_output.as_deref(),
            report.as_deref(),
        ),
        Command::Layout { image1, image2 } => run_layout(&config, image1, image2),
        Command::Crop {
            input,
            output,
            top,
            bottom,
            left,
            right,
        } => run_crop(
            input,
            output,
            CropRect {
                top: *top,
                bottom: *bottom,
                left: *left,
                right: *right,
            },
        ),
    }
}

fn run_compare(
    config: &Config,
    image1: &Path,
    image2: &Path,
    diff_output: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let options = config.diff_options();

    let first = raster::load_rgb(image1)
        .with_context(|| format!("Failed to load {}", image1.display()))?;
    let second = raster::load_rgb(image2)
        .with_context(|| format!("Failed to load {}", image2.display()))?;

    let comparison = analysis::compare_images(&first, &second, &options);
    print!("{}", report::render_summary(&comparison.result, image1, image2));

    if let Some(path) = diff_output {
        let overlay = analysis::render_overlay(&first, &comparison.mask, options.highlight);
        raster::save_rgb(&overlay, path)
            .with_context(|| format!("Failed to save diff image {}", path.display()))?;
        println!("\nDifference image saved to: {}", path.display());
    }

    if let Some(path) = report_path {
        report::write_json(&comparison.result, image1, image2, path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("\nReport saved to: {}", path.display());
    }

    Ok(())
}

fn run_layout(config: &Config, image1: &Path, image2: &Path) -> Result<()> {
    let options = config.diff_options();

    let first = raster::load_rgb(image1)
        .with_context(|| format!("Failed to load {}", image1.display()))?;
    let second = raster::load_rgb(image2)
        .with_context(|| format!("Failed to load {}", image2.display()))?;

    let comparison = analysis::compare_images(&first, &second, &options);
    let hotspots = analysis::layout_hotspots(&comparison.mask);
    print!("{}", report::render_layout(&comparison.result, &hotspots));

    Ok(())
}

fn run_crop(input: &Path, output: &Path, rect: CropRect) -> Result<()> {
    let image = raster::load_image(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let section = crop::crop_section(&image, &rect)?;
    raster::save_image(&section, output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    println!(
        "Cropped {} -> {} ({}x{})",
        input.display(),
        output.display(),
        section.width(),
        section.height()
    );

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("layout_diff={level},warn", level = log_level))
    });

    // Logs go to stderr so the comparison summary on stdout stays clean
    if let Some(log_file_path) = &args.log_file {
        let file = File::create(log_file_path)?;

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
    } else {
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                    .init();
            }
        }
    }

    Ok(())
}

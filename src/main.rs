//! vasfa - Build a VAS archive from a directory of mask images.
//!
//! Crops every transparent `.png` under the directory to its visible area, groups
//! co-located masks into WatchZones and packages the crops with `structure.xml`
//! and `script.asl` into `<directory>/<directory name>.vas`.

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info};
use vas_architect::config::{ArchitectConfig, DEFAULT_TOLERANCE, DistanceMetric};
use vas_architect::logging::init_logging;
use vas_architect::VasArchitect;

/// Distance metric used when comparing mask corners.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum MetricArg {
    /// Per-axis difference (default)
    #[default]
    Chebyshev,
    /// Straight-line distance
    Euclidean,
}

impl From<MetricArg> for DistanceMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Chebyshev => DistanceMetric::Chebyshev,
            MetricArg::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

/// Build a VAS archive from a directory of transparent mask images.
#[derive(Parser, Debug)]
#[command(name = "vasfa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the mask images (searched recursively)
    directory: PathBuf,

    /// Maximum corner distance, in pixels, for masks to share a WatchZone
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u32,

    /// Distance metric for corner comparison
    #[arg(short, long, value_enum, default_value_t = MetricArg::Chebyshev)]
    metric: MetricArg,

    /// Screen name written to the profile
    #[arg(long, default_value = "Game")]
    screen_name: String,

    /// Capture width written to the profile
    #[arg(long, default_value_t = 1280)]
    screen_width: u32,

    /// Capture height written to the profile
    #[arg(long, default_value_t = 720)]
    screen_height: u32,

    /// Archive path (defaults to <directory>/<directory name>.vas)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> ArchitectConfig {
        let mut config = ArchitectConfig::default();
        config.grouping.tolerance = self.tolerance;
        config.grouping.metric = self.metric.into();
        config.profile.screen_name = self.screen_name.clone();
        config.profile.screen_width = self.screen_width;
        config.profile.screen_height = self.screen_height;
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if !args.directory.is_dir() {
        bail!("{} is not a directory", args.directory.display());
    }

    let config = args.to_config();
    init_logging(&args.directory.join(&config.output.log_file_name))?;
    info!(
        "Tolerance {} px, metric {}.",
        config.grouping.tolerance, config.grouping.metric
    );

    let architect = VasArchitect::new(config);
    let summary = match architect.run(&args.directory, args.output.as_deref()) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return Err(e).with_context(|| {
                format!("could not build VAS archive for {}", args.directory.display())
            });
        }
    };

    let message = summary.message();
    info!("{}", message);
    println!("{}", message);
    println!("Archive: {}", summary.archive_path.display());
    Ok(())
}

mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use common::export::write_export;
use common::helpers::SundexError;
use sundex::catalog::Catalog;
use sundex::constants::DEFAULT_SEASON;
use sundex::models::bbox::BoundingBox;
use sundex::modules::goodday::config::{GoodDayModelConfig, Thresholds};
use sundex::modules::goodday::models::estimate_good_days;
use sundex::raster::reader::load_monthly;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "sundex Good Weather Days climatology",
    long_about = "Estimates the expected number of good weather days per grid cell from \
monthly climate normal rasters, combining solar transmittance, precipitation and \
temperature criteria, and writes the result as a JSON export."
)]
struct Args {
    #[arg(required = true, help = "Directory tree containing the monthly rasters", index = 1)]
    data_dir: PathBuf,

    #[arg(required = true, help = "Path of the JSON export to write", index = 2)]
    output: PathBuf,

    #[arg(long, default_value_t = -124.85, allow_hyphen_values = true, help = "Western bound [deg]")]
    west: f64,

    #[arg(long, default_value_t = -116.90, allow_hyphen_values = true, help = "Eastern bound [deg]")]
    east: f64,

    #[arg(long, default_value_t = 45.50, allow_hyphen_values = true, help = "Southern bound [deg]")]
    south: f64,

    #[arg(long, default_value_t = 49.05, allow_hyphen_values = true, help = "Northern bound [deg]")]
    north: f64,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Months to evaluate, comma separated [1-12]; defaults to the winter season"
    )]
    months: Option<Vec<u32>>,

    #[arg(long, default_value = "interactive", help = "Calibration preset: interactive, sundex-v2 or webapp-v2")]
    preset: String,

    #[arg(long, default_value_t = 0.40, help = "Minimum solar transmittance for a good day [0-1]")]
    solar_min: f64,

    #[arg(long, default_value_t = 2.5, help = "Maximum daily precipitation for a good day [mm]")]
    precip_max: f64,

    #[arg(long, default_value_t = -5.0, allow_hyphen_values = true, help = "Minimum temperature for a good day [°C]")]
    temp_min: f64,

    #[arg(long, help = "Block-mean downsampling factor for the export")]
    downsample: Option<usize>,
}

fn run(args: &Args) -> Result<(), SundexError> {
    let months = args
        .months
        .clone()
        .unwrap_or_else(|| DEFAULT_SEASON.to_vec());
    if months.is_empty() {
        return Err(SundexError::from("No months to evaluate"));
    }
    if let Some(&month) = months.iter().find(|&&m| !(1..=12).contains(&m)) {
        return Err(SundexError::from(format!("Invalid month: {}", month)));
    }
    if args.precip_max <= 0.0 {
        return Err(SundexError::from("precip-max must be positive"));
    }
    if args.west >= args.east || args.south >= args.north {
        return Err(SundexError::from("Degenerate bounding box"));
    }

    let bbox = BoundingBox::new(args.west, args.east, args.south, args.north);
    let thresholds = Thresholds {
        solar_min: args.solar_min,
        precip_max: args.precip_max,
        temp_min: args.temp_min,
    };
    let config = GoodDayModelConfig::new(&args.preset);
    info!("Using the {} calibration", config.model_version);

    info!("Scanning {} for monthly rasters", args.data_dir.display());
    let catalog = Catalog::scan(&args.data_dir)?;
    let coverage = catalog.coverage(&months);
    if coverage.missing.is_empty() {
        info!("Catalog coverage: {}", coverage);
    } else {
        warn!("Catalog coverage: {}", coverage);
    }

    let data = load_monthly(&catalog, &bbox, &months)?;
    if data.is_empty() {
        return Err(SundexError::from("No rasters found for the requested months"));
    }
    if let Some((rows, cols)) = data.shape() {
        info!("Working grid: {} rows x {} cols", rows, cols);
    }

    let result = estimate_good_days(&data, &months, &thresholds, &config)
        .ok_or_else(|| SundexError::from("Estimation produced no output"))?;
    let valid = result.combined.iter().filter(|v| !v.is_nan());
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &v in valid {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() {
        info!(
            "Good days range {:.1}-{:.1} over a {:.0} day period",
            lo, hi, result.total_days
        );
    } else {
        warn!("No cell has data for any requested month");
    }

    write_export(
        &args.output,
        &data,
        &result,
        &months,
        &thresholds,
        &config,
        args.downsample,
    )?;
    info!("Export written to {}", args.output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    run(&args)?;
    Ok(())
}

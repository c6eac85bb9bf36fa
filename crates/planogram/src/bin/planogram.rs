//! planogram - check shelf detections against a reference layout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use planogram::io::{run_check, PlanogramCheckConfig, PlanogramCheckReport};
use planogram::{
    iou, read_reference_file, transform_bounding_box, BoundingBox, CanvasSize, Homography,
};

#[derive(Parser, Debug)]
#[command(name = "planogram", version, about = "Planogram compliance geometry tools")]
struct Cli {
    /// Log level (error|warn|info|debug|trace)
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a layout file and print it as JSON
    Layout {
        /// Layout file with `class x_center y_center width height` rows
        path: PathBuf,
        /// Image width for pixel output
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Image height for pixel output
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },
    /// Run a compliance check described by a JSON config
    Check {
        config: PathBuf,
        /// Report path (overrides the config)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// IoU of two boxes given as `xmin,ymin,xmax,ymax`
    Iou {
        #[arg(value_parser = parse_box, allow_hyphen_values = true)]
        a: BoundingBox,
        #[arg(value_parser = parse_box, allow_hyphen_values = true)]
        b: BoundingBox,
    },
    /// Map a box through a homography read from a JSON 3x3 array
    Warp {
        #[arg(long, value_name = "PATH")]
        homography: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(value_parser = parse_box, allow_hyphen_values = true)]
        bbox: BoundingBox,
    },
}

fn parse_box(s: &str) -> Result<BoundingBox, String> {
    let v: Vec<f64> = s
        .split(',')
        .map(|t| t.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid box '{s}': {e}"))?;
    let arr: [f64; 4] = v
        .try_into()
        .map_err(|_| format!("invalid box '{s}': expected 4 comma-separated numbers"))?;
    Ok(BoundingBox::from_array(arr))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    planogram::core::init_with_level(cli.log_level)?;
    #[cfg(feature = "tracing")]
    planogram::init_tracing(false);

    match cli.command {
        Command::Layout {
            path,
            width,
            height,
        } => {
            let table = read_reference_file(&path)?;
            let json = match (width, height) {
                (Some(w), Some(h)) => serde_json::to_string_pretty(&table.to_pixels(w, h))?,
                _ => serde_json::to_string_pretty(&table.entries)?,
            };
            println!("{json}");
        }
        Command::Check { config, output } => {
            let cfg = PlanogramCheckConfig::load_json(&config)?;
            let mut report = PlanogramCheckReport::new(&cfg, &config);
            match run_check(&cfg) {
                Ok(res) => {
                    println!(
                        "compliant {}/{} (wrong {}, missing {}, unexpected {})",
                        res.compliant(),
                        res.slots.len(),
                        res.wrong_product(),
                        res.missing(),
                        res.unexpected.len()
                    );
                    report.set_result(res);
                }
                Err(err) => {
                    warn!("check failed: {err}");
                    report.set_error(&err);
                }
            }
            let out = output.unwrap_or_else(|| cfg.output_path());
            report.write_json(&out)?;
            info!("report written to {}", out.display());
            if let Some(err) = report.error {
                return Err(err.into());
            }
        }
        Command::Iou { a, b } => {
            println!("{:.6}", iou(&a, &b));
        }
        Command::Warp {
            homography,
            width,
            height,
            bbox,
        } => {
            let rows: [[f64; 3]; 3] =
                serde_json::from_str(&std::fs::read_to_string(&homography)?)?;
            let h = Homography::from_array(rows);
            let out = transform_bounding_box(&bbox, &h, CanvasSize::new(width, height))?;
            println!("{}", serde_json::to_string(&out)?);
        }
    }

    Ok(())
}

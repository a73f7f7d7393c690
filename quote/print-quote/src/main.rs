//! Command-line quoting.
//!
//! # Commands
//!
//! - `print-quote assess <MODEL>` - Overhangs and slicer estimate as JSON
//! - `print-quote quote <MODEL>... --material <ID>` - Full priced quote as JSON
//!
//! Shop settings come from a JSON file (`--config`) holding pricing,
//! slicer, and overhang options. Logs go to stderr; `RUST_LOG` overrides
//! the level.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mesh_slice::SliceSettings;
use mesh_types::Orientation;
use print_quote::{Assessment, PipelineConfig, QuotePipeline};
use quote_pricing::{DeliveryLocation, Discount, QuoteRequest};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Instant quotes for 3D print uploads
#[derive(Parser)]
#[command(name = "print-quote")]
#[command(about = "Instant quotes for 3D print uploads", long_about = None)]
#[command(version)]
struct Cli {
    /// Shop settings (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a model for overhangs and estimate print time
    Assess {
        /// STL or 3MF file
        #[arg(name = "MODEL")]
        model: PathBuf,

        /// Build orientation as w,x,y,z (default: as uploaded or auto)
        #[arg(long, value_parser = parse_orientation)]
        orientation: Option<Orientation>,

        #[command(flatten)]
        slice: SliceArgs,
    },

    /// Price one or more models
    Quote {
        /// STL or 3MF files
        #[arg(name = "MODEL", required = true)]
        models: Vec<PathBuf>,

        /// Material id
        #[arg(short, long)]
        material: String,

        /// Support material id (default: same as material)
        #[arg(long)]
        support_material: Option<String>,

        /// Copies of each model
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Requester email
        #[arg(long)]
        email: Option<String>,

        /// Delivery state
        #[arg(long)]
        state: Option<String>,

        /// Delivery postcode
        #[arg(long)]
        postcode: Option<String>,

        /// Percentage discount
        #[arg(long)]
        discount_percent: Option<Decimal>,

        #[command(flatten)]
        slice: SliceArgs,
    },
}

#[derive(Args)]
struct SliceArgs {
    /// Layer height (mm)
    #[arg(long, default_value_t = 0.2)]
    layer_height: f64,

    /// Infill (%)
    #[arg(long, default_value_t = 20)]
    infill: u8,

    /// Force supports on
    #[arg(long)]
    supports: bool,
}

impl SliceArgs {
    fn settings(&self) -> SliceSettings {
        let settings = SliceSettings::default()
            .with_layer_height(self.layer_height)
            .with_infill(self.infill);
        if self.supports {
            settings.with_supports(None, None)
        } else {
            settings
        }
    }
}

#[derive(Serialize)]
struct QuoteOutput {
    assessments: Vec<Assessment>,
    quote: quote_pricing::PricedQuote,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let pipeline = QuotePipeline::new(config);

    match cli.command {
        Commands::Assess {
            model,
            orientation,
            slice,
        } => {
            let mesh = load_mesh(&pipeline, &model)?;
            let assessment =
                pipeline.assess(&mesh_id(&model), &mesh, orientation, &slice.settings())?;
            print_json(&assessment)
        }
        Commands::Quote {
            models,
            material,
            support_material,
            quantity,
            email,
            state,
            postcode,
            discount_percent,
            slice,
        } => {
            let settings = slice.settings();
            let assessments = models
                .iter()
                .map(|path| {
                    let mesh = load_mesh(&pipeline, path)?;
                    pipeline
                        .assess(&mesh_id(path), &mesh, None, &settings)
                        .with_context(|| format!("failed to assess {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;

            let request = QuoteRequest {
                items: assessments
                    .iter()
                    .map(|a| a.to_item(&material, support_material.as_deref(), quantity))
                    .collect(),
                location: DeliveryLocation::new(state.as_deref(), postcode.as_deref()),
                requester_email: email,
                discount: discount_percent.map(Discount::Percent),
            };
            let quote = pipeline.quote(&request)?;
            print_json(&QuoteOutput { assessments, quote })
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_mesh(pipeline: &QuotePipeline, path: &Path) -> Result<mesh_types::TriangleMesh> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    pipeline
        .load(&bytes, filename)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn mesh_id(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

fn parse_orientation(text: &str) -> Result<Orientation> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .context("orientation components must be numbers")?;
    let Ok(components) = <[f64; 4]>::try_from(parts) else {
        bail!("orientation needs four components: w,x,y,z");
    };
    Ok(Orientation::from_wxyz(components)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

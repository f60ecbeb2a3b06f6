use anyhow::{Context, Result};
use bead_pattern::color_table::{parse_table, selection_filter};
use bead_pattern::pipeline::{fit_height, generate};
use bead_pattern::render::encode_png;
use bead_pattern::usage::write_csv;
use bead_pattern::{PatternRequest, SampleMode};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn an image into a labelled bead pattern using a table of standard colors.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Color table CSV (header row, then `code,hex` rows)
    #[arg(short, long)]
    table: PathBuf,

    /// Cells per row
    #[arg(short = 'w', long, default_value_t = 16)]
    width: u32,

    /// Cells per column. Derived from the image aspect ratio when omitted.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Edge length of one rendered cell in pixels
    #[arg(short, long, default_value_t = 24)]
    cell_size: u32,

    /// Sampling mode: dominant, average, center, fractional, predownscaled
    #[arg(short, long, default_value_t = SampleMode::Dominant)]
    mode: SampleMode,

    /// Ignore a 15% margin around each block when sampling
    #[arg(long)]
    exclude_edge: bool,

    /// Do not draw grid lines
    #[arg(long)]
    no_grid: bool,

    /// Comma-separated color codes to use (defaults to codes A–M)
    #[arg(short, long)]
    select: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "pattern.png")]
    output: PathBuf,

    /// Also write the used colors, sorted by code, to this CSV file
    #[arg(long)]
    colors_csv: Option<PathBuf>,

    /// Print the used colors as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bead_pattern=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let args = Args::parse();

    let selected: Vec<String> = args
        .select
        .as_deref()
        .map(|s| {
            s.split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let table_text = fs::read_to_string(&args.table)
        .with_context(|| format!("reading color table {}", args.table.display()))?;
    let table = parse_table(&table_text, selection_filter(&selected));
    if !table.skipped.is_empty() {
        tracing::warn!(count = table.skipped.len(), "Color table rows skipped");
    }

    let source = image::open(&args.input)
        .with_context(|| format!("decoding {}", args.input.display()))?
        .to_rgba8();

    let height = args
        .height
        .unwrap_or_else(|| fit_height(args.width, source.width(), source.height()));
    let request = PatternRequest {
        pixel_width: args.width,
        pixel_height: height,
        cell_size: args.cell_size,
        sample_mode: args.mode,
        exclude_edge: args.exclude_edge,
        show_grid: !args.no_grid,
    };

    let pattern =
        generate(&source, &table.palette, &request).context("pattern generation failed")?;

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, encode_png(&pattern.image)?)?;
    println!("Saved → {}", args.output.display());

    if let Some(path) = &args.colors_csv {
        let file = fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_csv(&pattern.used_colors, file)?;
        println!("Saved → {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pattern.used_colors)?);
    }

    Ok(())
}

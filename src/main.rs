// shelf-labels: Generate printable shelf labels from a spreadsheet of locations

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shelf_labels::config::{
    LabelConfig, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_SERVER_ADDR,
};
use shelf_labels::font::DEFAULT_FONT_FILE;
use shelf_labels::server::{start_server, ServerState};
use shelf_labels::{load_locations, AppError, LabelFont, LabelRenderer, Symbology};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate printable shelf labels from a spreadsheet of locations")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Spreadsheet with a 'Ubicaciones' column
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// Output PDF
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Sheet to read (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Font for the location text, used when the file exists
    #[arg(long, global = true, default_value = DEFAULT_FONT_FILE)]
    font: PathBuf,

    /// Symbol printed on each label
    #[arg(long, global = true, value_enum, default_value_t = Symbology::DataMatrix)]
    symbology: Symbology,

    /// Print the render summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve an upload form that previews the sheet and offers the label PDF
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_SERVER_ADDR)]
        addr: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let args = Args::parse();
    init_logging(args.json);

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // Keep stdout clean for the JSON summary
    if json {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = LabelConfig {
        input: args.input,
        output: args.output,
        font: args.font,
        sheet: args.sheet,
        symbology: args.symbology,
    };

    match args.command {
        Some(Command::Serve { addr }) => serve(&config, &addr),
        None => generate(&config, args.json),
    }
}

fn generate(config: &LabelConfig, json: bool) -> Result<(), AppError> {
    info!("Looking for {}...", config.input.display());
    let records = load_locations(&config.input, config.sheet.as_deref())?;
    info!("Workbook loaded, {} locations found", records.len());

    let font = LabelFont::load_or_default(&config.font);
    let renderer = LabelRenderer::new(&font, &config.symbology);
    let (pdf, summary) = renderer.render_to_bytes(&records)?;
    std::fs::write(&config.output, pdf)?;

    if json {
        let report = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{}", report);
        return Ok(());
    }

    println!("✓ Generated: {}", config.output.display());
    println!("  Labels: {}", summary.labels.len());
    println!("  Pages: {}", summary.pages);
    println!("  Font: {}", font.name());
    if summary.symbol_failures > 0 {
        println!("  Symbols skipped: {}", summary.symbol_failures);
    }

    Ok(())
}

fn serve(config: &LabelConfig, addr: &str) -> Result<(), AppError> {
    let font = LabelFont::load_or_default(&config.font);
    let state = ServerState::new(font, config.symbology);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(start_server(addr, state))
}

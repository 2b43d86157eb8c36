//! # Backup Minify - Main Entry Point
//!
//! Punto di ingresso del tool di minificazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing`
//! - Costruzione della configurazione immutabile e avvio del run
//! - Mappatura di ogni errore fatale su una riga `ERROR:` e exit code 1
//!
//! ## Esempio di utilizzo:
//! ```bash
//! backup-minify --source=/backup/systemstorage --target=/var/dev-storage \
//!     --imageconverter=imagemagick --skipExistingFiles=1
//! ```
//!
//! I nomi storici dei flag (incluso il refuso `--quiteMode`, ancora accettato
//! con un avviso di deprecazione) vengono mantenuti perché il tool viene
//! invocato da script di provisioning esistenti.

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use backup_minify::{Config, ImageConverter, Minifier};

#[derive(Parser)]
#[command(name = "backup-minify")]
#[command(about = "Replace a media backup tree with a size-reduced replica for development use")]
struct Args {
    /// Root of the tree to minify
    #[arg(long)]
    source: Option<PathBuf>,

    /// Root of the output tree (must already exist)
    #[arg(long)]
    target: Option<PathBuf>,

    /// Leave files already present in the target untouched (resume support)
    #[arg(long = "skipExistingFiles", default_value = "1", value_parser = BoolishValueParser::new())]
    skip_existing_files: bool,

    /// Suppress routine progress output (warnings and errors still shown)
    #[arg(long = "quietMode", value_parser = BoolishValueParser::new())]
    quiet_mode: Option<bool>,

    /// Historical misspelling of --quietMode, kept for old wrapper scripts
    #[arg(long = "quiteMode", hide = true, value_parser = BoolishValueParser::new())]
    quite_mode: Option<bool>,

    /// Image converter dialect: imagemagick, im, graphicsmagick or gm
    #[arg(long = "imageconverter")]
    imageconverter: Option<String>,

    /// Recompression quality handed to the converter (1-100)
    #[arg(long, default_value = "1")]
    quality: u8,

    /// Palette size handed to the converter
    #[arg(long, default_value = "16")]
    colors: u32,

    /// Comma-separated extensions handled by the image converter
    #[arg(long = "imageExtensions", default_value = "jpg,png")]
    image_extensions: String,

    /// Print the final statistics as a single JSON object on stdout
    #[arg(long = "jsonSummary", default_value = "0", value_parser = BoolishValueParser::new())]
    json_summary: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let source = args
        .source
        .ok_or_else(|| anyhow::anyhow!("Please provide a source path using --source=<path>"))?;
    let target = args
        .target
        .ok_or_else(|| anyhow::anyhow!("Please provide a target path using --target=<path>"))?;
    let converter: ImageConverter = args
        .imageconverter
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Please provide a valid image converter using --imageconverter=<imageconverter>"
            )
        })?
        .parse()?;

    let quiet_mode = match (args.quiet_mode, args.quite_mode) {
        (Some(quiet), _) => quiet,
        (None, Some(quiet)) => {
            warn!("--quiteMode is deprecated, use --quietMode");
            quiet
        }
        (None, None) => false,
    };

    let image_extensions: Vec<String> = args
        .image_extensions
        .split(',')
        .map(|ext| ext.trim().to_string())
        .filter(|ext| !ext.is_empty())
        .collect();

    let config = Config {
        source,
        target,
        skip_existing_files: args.skip_existing_files,
        quiet_mode,
        convert_binary: converter.default_binary(),
        converter,
        image_quality: args.quality,
        image_colors: args.colors,
        image_extensions,
        json_summary: args.json_summary,
    };
    let json_summary = config.json_summary;

    let mut minifier = Minifier::new(config)?;
    let stats = minifier.run().await?;

    if json_summary {
        println!("{}", serde_json::to_string(&stats)?);
    }

    Ok(())
}

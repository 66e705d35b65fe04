mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "couponhunt-cli")]
#[command(about = "Find coupon codes and coupon forms from the command line")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check whether a string looks like a coupon code.
    Validate { code: String },
    /// List candidate promo images on a page.
    Images {
        url: String,
        /// Also read text from the images with OCR.
        #[arg(long)]
        ocr: bool,
    },
    /// Search the coupon aggregator sites for a merchant.
    Probe { merchant: String },
    /// Remove tags (and their contents) from an HTML file, or stdin with `-`.
    Clean {
        input: String,
        #[arg(long, value_delimiter = ',', required = true)]
        tags: Vec<String>,
    },
    /// Run the coupon-finding agent against a page URL.
    Analyze { url: String },
    /// Locate the coupon input and apply button in an HTML file, or stdin with `-`.
    AnalyzeForm { input: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = couponhunt_core::load_app_config()?;

    let fallback = if cli.verbose {
        "debug".to_owned()
    } else {
        config.log_level.clone()
    };
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Commands::Validate { code } => commands::validate(&code)?,
        Commands::Images { url, ocr } => commands::images(&config, &url, ocr).await?,
        Commands::Probe { merchant } => commands::probe(&config, &merchant).await?,
        Commands::Clean { input, tags } => commands::clean(&input, &tags)?,
        Commands::Analyze { url } => commands::analyze(&config, &url).await?,
        Commands::AnalyzeForm { input } => commands::analyze_form(&config, &input).await?,
    };

    println!("{output}");
    Ok(())
}

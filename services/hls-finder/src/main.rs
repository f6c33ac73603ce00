//! HLS tile finder CLI.
//!
//! Looks up the tile covering a coordinate, lists the HLS objects for the
//! requested product and date, searches forward for the other product and
//! optionally downloads bands from both.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use hls_common::{AcquisitionDate, BandSuffix, Product};
use storage::{
    build_client, load_grid, AzureBlobLister, BlobLister, CredentialProvider, ObjectStoreLister,
    PlanetaryComputerTokenProvider, SasToken, StaticTokenProvider,
};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use hls_finder::config::{FinderConfig, ListingBackend};
use hls_finder::finder::{FindOutcome, FindReport, FindRequest, Finder, ProductReport};

/// Downloads are whole rasters; allow far longer than a listing.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Parser, Debug)]
#[command(name = "hls-finder")]
#[command(about = "Find HLS imagery covering a coordinate")]
struct Args {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Acquisition year
    #[arg(long, default_value = "2019")]
    year: i32,

    /// Day of year (1-366)
    #[arg(long, default_value = "1")]
    day: u32,

    /// Product to list (S30 or L30)
    #[arg(long, default_value = "S30")]
    product: Product,

    /// Band to download, e.g. 01, _01 or .B04
    #[arg(long, default_value = "01")]
    band: BandSuffix,

    /// Download the red, green and blue bands instead of --band
    #[arg(long)]
    rgb: bool,

    /// Days to search forward for the other product (overrides config)
    #[arg(long)]
    search_days: Option<u32>,

    /// Download the selected band(s) into this directory
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, env = "HLS_CONFIG")]
    config: Option<PathBuf>,

    /// SAS token (overrides config and token endpoint)
    #[arg(long, env = "HLS_SAS_TOKEN", hide_env_values = true)]
    sas_token: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout carries only results
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn credential_provider(
    config: &FinderConfig,
    cli_token: Option<&str>,
) -> Result<Option<Box<dyn CredentialProvider>>> {
    let fixed = cli_token
        .filter(|t| !t.trim().is_empty())
        .map(|t| SasToken::new(t.trim(), None))
        .or_else(|| config.credentials.static_token());

    if let Some(token) = fixed {
        return Ok(Some(Box::new(StaticTokenProvider::new(token))));
    }
    match &config.credentials.token_endpoint {
        Some(endpoint) => Ok(Some(Box::new(PlanetaryComputerTokenProvider::new(
            endpoint.as_str(),
        )?))),
        None => Ok(None),
    }
}

async fn obtain_token(config: &FinderConfig, cli_token: Option<&str>) -> Result<SasToken> {
    match credential_provider(config, cli_token)? {
        Some(provider) => provider
            .get_token()
            .await
            .context("Failed to obtain SAS token"),
        None => {
            info!("No credentials configured, using anonymous access");
            Ok(SasToken::new("", None))
        }
    }
}

fn build_lister(config: &FinderConfig, token: &SasToken) -> Result<Arc<dyn BlobLister>> {
    let storage = &config.storage;
    let lister: Arc<dyn BlobLister> = match storage.backend {
        ListingBackend::Rest => Arc::new(AzureBlobLister::new(
            &storage.account_url,
            &storage.container,
            token.clone(),
        )?),
        ListingBackend::ObjectStore => Arc::new(ObjectStoreLister::azure(
            &storage.account_name()?,
            &storage.container,
            token,
        )?),
    };
    Ok(lister)
}

fn print_product(label: &str, report: &ProductReport) {
    println!("{} {} ({}):", label, report.product, report.date);
    if report.is_empty() {
        println!("  no objects under {}", report.prefix);
    }
    for link in &report.objects {
        println!("  {}", link.key);
        println!("    {}", link.url);
    }
}

fn print_report(report: &FindReport) {
    println!("Tile: {}", report.tile_id);
    print_product("Requested", &report.requested);
    match &report.other {
        Some(other) => print_product("Nearest", other),
        None => println!("No imagery found for the other product"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let config = FinderConfig::load_or_default(args.config.as_deref())?;
    let date = AcquisitionDate::new(args.year, args.day)?;

    let grid_source = config.grid.grid_source()?;
    let grid = Arc::new(load_grid(&grid_source).await?);

    let token = obtain_token(&config, args.sas_token.as_deref()).await?;
    if token.expires_within(Utc::now(), chrono::Duration::minutes(5)) {
        warn!(expires_at = ?token.expires_at(), "SAS token expires soon");
    }
    let lister = build_lister(&config, &token)?;
    let finder = Finder::new(grid, lister, config.storage.location(), token);

    let request = FindRequest {
        lat: args.lat,
        lon: args.lon,
        date,
        product: args.product,
        version: config.search.version.clone(),
        max_days: args.search_days.unwrap_or(config.search.max_days),
    };

    let outcome = finder.find(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    let report = match outcome {
        FindOutcome::Uncovered { lat, lon } => {
            if !args.json {
                println!("No tile covers ({}, {})", lat, lon);
            }
            return Ok(());
        }
        FindOutcome::Found(report) => report,
    };

    if !args.json {
        print_report(&report);
    }

    let Some(dir) = args.download_dir else {
        return Ok(());
    };

    let bands: Vec<BandSuffix> = if args.rgb {
        report
            .requested
            .product
            .rgb_bands()
            .iter()
            .map(|b| b.parse::<BandSuffix>())
            .collect::<Result<_, _>>()?
    } else {
        vec![args.band]
    };

    let client = build_client(DOWNLOAD_TIMEOUT)?;
    for product_report in std::iter::once(&report.requested).chain(report.other.as_ref()) {
        for band in &bands {
            if let Some(path) = finder
                .download_band(&client, product_report, &request.version, band, &dir)
                .await?
            {
                info!(path = %path.display(), "Saved");
                if !args.json {
                    println!("Downloaded {}", path.display());
                }
            }
        }
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use meteo_core::Config;
use meteo_ui::{ControllerOptions, WeatherController};
use meteo_weather::{
    Coordinates, DashboardCard, DemoSource, FixedGeolocator, Geolocator, ProxyClient,
    UnsupportedGeolocator, WeatherSource,
};
use tokio::runtime::Handle;

/// Current conditions for your position or a city.
#[derive(Debug, Parser)]
#[command(name = "meteo", version)]
struct Args {
    /// Look up a city instead of the current position
    #[arg(long)]
    city: Option<String>,

    /// Latitude reported as the device position
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude reported as the device position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the dashboard as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    meteo_core::init()?;
    let args = Args::parse();

    let (config, validation) = Config::load_validated(args.config.as_deref())?;
    tracing::info!(
        "Meteo started ({} config warning(s))",
        validation.warnings.len()
    );

    let position = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => config.geolocation.fixed_position(),
    };

    match position {
        Some((lat, lon)) => {
            let geolocator = FixedGeolocator::new(Coordinates::new(lat, lon));
            with_source(geolocator, &config, &args).await
        }
        None => with_source(UnsupportedGeolocator, &config, &args).await,
    }
}

async fn with_source<G: Geolocator>(geolocator: G, config: &Config, args: &Args) -> Result<()> {
    match config.proxy.base_url.as_deref() {
        Some(base_url) => {
            let client = ProxyClient::with_timeout(base_url, config.proxy.request_timeout())
                .context("Failed to build weather proxy client")?;
            tracing::info!("Using weather proxy at {}", client.base_url());
            run(geolocator, client, config, args).await
        }
        None => {
            tracing::info!("No weather proxy configured, using demo data");
            run(geolocator, DemoSource, config, args).await
        }
    }
}

async fn run<G: Geolocator, S: WeatherSource>(
    geolocator: G,
    source: S,
    config: &Config,
    args: &Args,
) -> Result<()> {
    let options = ControllerOptions::from_config(config);
    let mut controller = WeatherController::new(geolocator, source, options, Handle::current());

    if let Some(city) = &args.city {
        controller.search_city(city);
    }
    controller.run_until_idle().await;

    let state = controller.state();
    let card = state.snapshot().map(DashboardCard::new);
    let badge = if controller.is_live() { "Live" } else { "Démo" };

    if args.json {
        let report = serde_json::json!({
            "badge": badge,
            "stale": state.is_stale(),
            "card": card,
            "error": state.error().map(|e| serde_json::json!({
                "kind": e.kind,
                "title": e.title(),
                "message": e.message,
                "retryable": e.is_retryable(),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("[{}]", badge);
    if let Some(card) = &card {
        println!("{}", card);
    }
    if let Some(error) = state.error() {
        println!();
        println!("{}", error);
        if error.is_retryable() {
            println!("Cherchez une ville avec --city, ou indiquez --lat/--lon.");
        }
    }

    Ok(())
}

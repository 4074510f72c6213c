use clap::{Parser, Subcommand};
use serde::Serialize;
use spechome_core::{find_nearby, property_schools, AppConfig, GeoPoint, SearchFilters};
use spechome_listings::ListingsClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "spechome-cli")]
#[command(about = "Teardown and spec-home analysis from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List for-sale teardown candidates under a price ceiling
    Teardowns {
        /// Maximum asking price (defaults to 1,000,000)
        #[arg(long)]
        max_price: Option<u64>,
        /// Restrict the search to one city (e.g., Hinsdale)
        #[arg(long)]
        city: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Rank recent sold comps around a coordinate
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        city: Option<String>,
        /// Radius in miles
        #[arg(long, default_value = "1.0")]
        radius: f64,
    },
    /// Show schools and the school district for a property
    Schools {
        #[arg(long)]
        zpid: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Commands, config: &AppConfig, client: &ListingsClient) -> anyhow::Result<()> {
    match command {
        Commands::Teardowns {
            max_price,
            city,
            page,
        } => {
            let filters = SearchFilters::teardown_candidates(max_price, city);
            let results = client.search_page(&filters, page.max(1)).await?;
            print_json(&results)
        }
        Commands::Nearby {
            lat,
            lng,
            city,
            radius,
        } => {
            let nearby = find_nearby(
                client,
                GeoPoint { lat, lng },
                city.as_deref(),
                radius,
                config.page_policy(),
                &client.region().distance,
            )
            .await;
            print_json(&nearby)
        }
        Commands::Schools { zpid } => {
            let report = property_schools(client, &zpid).await?;
            print_json(&report)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = spechome_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "loaded configuration");

    let region = spechome_core::load_region_config(&config)?;
    let client = ListingsClient::new(&config, region)?;
    run(cli.command, &config, &client).await
}

#[cfg(test)]
mod tests;

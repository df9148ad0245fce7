use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select};
use weatherdash_core::{
    Aggregator, Config, Coordinate, DashboardView, PlaceQuery, RecentPlacesStore, WeatherProvider,
    config::API_KEY_ENV,
    funfacts::{DailyRefresh, FUN_FACTS_REFRESH},
    location::{current_device_location, location_service_from_config},
    provider_from_config,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key and an optional home location.
    Configure,

    /// Show weather for a place.
    Show {
        /// City name, optionally with a country code (e.g. "Paris,FR").
        /// If absent, pick from recent searches.
        place: Option<String>,
    },

    /// Show weather at a coordinate.
    At {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },

    /// Show weather for the current location.
    Here {
        /// Locate by IP address even if a home location is configured.
        #[arg(long)]
        ip: bool,
    },

    /// List recent searches.
    Recent,

    /// Show today's solar term and the next meteor shower.
    Facts {
        /// Keep running and print the facts again every day.
        #[arg(long)]
        follow: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        let needs_key = matches!(
            self.command,
            Command::Show { .. } | Command::At { .. } | Command::Here { .. }
        );
        if needs_key && config.api_key().is_none() {
            tracing::error!(
                "No weather API key configured. Run `weatherdash configure` or set {API_KEY_ENV}."
            );
        }

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show { place } => {
                let place = match place {
                    Some(place) => place,
                    None => pick_recent_place()?,
                };
                remember_place(&place);
                show(&config, PlaceQuery::name(place)?).await?;
            }
            Command::At { latitude, longitude } => {
                show(&config, PlaceQuery::coordinates(latitude, longitude)?).await?;
            }
            Command::Here { ip } => {
                let service = location_service_from_config(&config, ip);
                let coordinate = current_device_location(service.as_ref())
                    .await
                    .context("Unable to get your location. Try `weatherdash show <city>` instead")?;
                show(&config, PlaceQuery::Coordinates(coordinate)).await?;
            }
            Command::Recent => {
                let places = RecentPlacesStore::open_default()?.load()?;
                print!("{}", output::render_recent(&places));
            }
            Command::Facts { follow } => {
                print!("{}", output::render_fun_facts(Local::now().date_naive()));
                if follow {
                    follow_fun_facts().await?;
                }
            }
        }

        Ok(())
    }
}

async fn show(config: &Config, query: PlaceQuery) -> anyhow::Result<()> {
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);
    let aggregator = Aggregator::new(provider);

    let mut view = DashboardView::default();
    view.apply(aggregator.aggregate(&query).await);

    if let Some(message) = view.error() {
        bail!("{message}");
    }
    print!("{}", output::render_view(&view));
    Ok(())
}

/// Recording a search is best-effort; a failure must not block the lookup.
fn remember_place(place: &str) {
    let result = RecentPlacesStore::open_default().and_then(|store| store.record(place));
    if let Err(e) = result {
        tracing::warn!(error = %e, "Could not update recent places");
    }
}

fn pick_recent_place() -> anyhow::Result<String> {
    let places = RecentPlacesStore::open_default()?.load()?;
    if places.is_empty() {
        bail!("No recent searches yet.\nHint: run `weatherdash show <city>`.");
    }

    let choice = Select::new("Recent searches:", places.entries().to_vec()).prompt()?;
    Ok(choice)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    if Confirm::new("Set a home location for `weatherdash here`?")
        .with_default(config.location.home.is_some())
        .prompt()?
    {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()?;

        let home = Coordinate::new(latitude, longitude)
            .ok_or_else(|| anyhow!("({latitude}, {longitude}) is not a usable coordinate"))?;
        config.set_home(Some(home));
    } else {
        config.set_home(None);
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn follow_fun_facts() -> anyhow::Result<()> {
    let _refresh = DailyRefresh::spawn(FUN_FACTS_REFRESH, || async {
        print!("{}", output::render_fun_facts(Local::now().date_naive()));
    });

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    Ok(())
}

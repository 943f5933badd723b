use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, Password};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::{JoinError, JoinSet},
};
use weatherlook_core::{
    Config, Coordinates, FixedGeolocator, Geolocator, IpGeolocator, LookupController,
    LookupOutcome, LookupState, NoGeolocator, ProviderId, WeatherObservation,
    provider::provider_from_config,
};

use crate::render::render_snapshot;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherlook", version, about = "Current weather by place name or location")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weatherstack" or "weatherapi".
        provider: String,
    },

    /// Show current weather for a place.
    Show {
        /// City, town or any text the provider understands.
        #[arg(required = true, num_args = 1..)]
        place: Vec<String>,

        #[arg(long)]
        provider: Option<String>,
    },

    /// Show current weather where you are.
    Here {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long)]
        provider: Option<String>,
    },

    /// Locate in the background and read place names from stdin.
    Interactive {
        #[arg(long)]
        provider: Option<String>,

        /// Skip the startup geolocation lookup.
        #[arg(long)]
        no_locate: bool,

        /// Show a demo observation until the first lookup finishes.
        #[arg(long)]
        demo: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure { provider } => {
                configure(&provider)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { place, provider } => {
                let config = load_config()?;
                let controller = controller(&config, provider.as_deref())?;

                let outcome = controller.search(&place.join(" ")).await;
                print!("{}", render_snapshot(&controller.snapshot()));
                Ok(exit_code(&outcome))
            }
            Command::Here { lat, lon, provider } => {
                let config = load_config()?;
                let controller = controller(&config, provider.as_deref())?;
                let fixed = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let geolocator = geolocator(&config, fixed)?;

                let outcome = controller.locate(geolocator.as_ref()).await;
                if let LookupOutcome::NoPosition(err) = &outcome {
                    eprintln!("Could not determine your location: {err}");
                    eprintln!("Hint: pass --lat/--lon or set [location] in the config file.");
                    return Ok(ExitCode::FAILURE);
                }
                print!("{}", render_snapshot(&controller.snapshot()));
                Ok(exit_code(&outcome))
            }
            Command::Interactive { provider, no_locate, demo } => {
                let config = load_config()?;
                let controller = Arc::new(controller(&config, provider.as_deref())?);
                let geolocator: Arc<dyn Geolocator> = if no_locate {
                    Arc::new(NoGeolocator)
                } else {
                    Arc::from(geolocator(&config, None)?)
                };

                interactive(controller, geolocator, demo || config.seed_demo).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    config.apply_env();
    Ok(config)
}

fn controller(config: &Config, provider: Option<&str>) -> anyhow::Result<LookupController> {
    let id = match provider {
        Some(name) => ProviderId::try_from(name)?,
        None => config.default_provider_id()?,
    };
    tracing::debug!(provider = %id, "using provider");

    Ok(LookupController::new(provider_from_config(id, config)?))
}

fn geolocator(
    config: &Config,
    fixed: Option<Coordinates>,
) -> anyhow::Result<Box<dyn Geolocator>> {
    if let Some(coords) = fixed.or(config.location) {
        return Ok(Box::new(FixedGeolocator(coords)));
    }
    let ip = IpGeolocator::new().context("Failed to set up IP geolocation")?;
    Ok(Box::new(ip))
}

fn exit_code(outcome: &LookupOutcome) -> ExitCode {
    match outcome {
        LookupOutcome::Completed(LookupState::Success(_)) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_help_message("Input is hidden")
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let make_default = config.default_provider_id().ok() != Some(id)
        && Confirm::new(&format!("Use {id} by default?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;

    config.upsert_provider_api_key(id, api_key);
    if make_default {
        config.set_default_provider(id);
    }

    let path = config.save()?;
    println!("Saved {id} configuration to {}", path.display());
    Ok(())
}

/// Drop lookups that already finished so a long session does not pile them up.
fn reap_finished(lookups: &mut JoinSet<LookupOutcome>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = lookups.try_join_next() {
        report_finished(joined);
        reaped += 1;
    }
    reaped
}

fn report_finished(joined: Result<LookupOutcome, JoinError>) {
    match joined {
        Ok(LookupOutcome::NoPosition(err)) => tracing::info!("startup location skipped: {err}"),
        Ok(outcome) => tracing::debug!(?outcome, "lookup finished"),
        Err(err) => tracing::warn!("lookup task failed: {err}"),
    }
}

/// Geolocation and searches run concurrently; every snapshot is printed.
async fn interactive(
    controller: Arc<LookupController>,
    geolocator: Arc<dyn Geolocator>,
    seed_demo: bool,
) -> anyhow::Result<()> {
    if seed_demo {
        controller.seed(WeatherObservation::demo());
    }

    let mut rx = controller.subscribe();
    let renderer = tokio::spawn(async move {
        println!("{}", render_snapshot(&rx.borrow_and_update()));
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            println!("{}", render_snapshot(&snapshot));
        }
    });

    let mut lookups = JoinSet::new();
    lookups.spawn({
        let controller = controller.clone();
        async move { controller.locate(geolocator.as_ref()).await }
    });

    eprintln!("Enter a city/town and press Enter (Ctrl-D to quit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        reap_finished(&mut lookups);
        let controller = controller.clone();
        lookups.spawn(async move { controller.search(&line).await });
    }

    while let Some(joined) = lookups.join_next().await {
        report_finished(joined);
    }

    // Closing the channel lets the renderer drain and stop.
    drop(controller);
    renderer.await.context("Renderer task failed")?;
    Ok(())
}

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use flight_edit::{
    Flight, FlightEditComponent, FlightEditConfig, FlightField, FlightForm, HttpFlightClient,
    InMemoryFlightStore, RecordUpdater, SaveStatus,
};
use std::sync::Arc;
use tracing::info;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env.local").ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Save { flight, dev } => save(flight.into(), dev).await,
        Commands::Validate { flight } => validate(flight.into()),
        Commands::ConfigPath => config_path(),
    }
}

async fn save(flight: Flight, dev: bool) -> Result<()> {
    let config = FlightEditConfig::load().context("Failed to load config")?;

    let updater: Arc<dyn RecordUpdater> = if dev {
        info!("using in-memory flight store");
        Arc::new(InMemoryFlightStore::seeded())
    } else {
        info!(api_url = %config.api_url, "using flight API");
        Arc::new(HttpFlightClient::new(&config.api_url).context("Failed to create API client")?)
    };

    let mut component = FlightEditComponent::new(updater, &config);
    component.init();
    component.on_changes(Some(&flight));
    print_validity(component.form());

    let mut changes = component.status_changes();
    component.save();
    changes
        .changed()
        .await
        .context("Save finished without reporting a status")?;

    let status = component.status();
    println!("{}", status);
    let last_error = component.last_error();
    component.destroy();

    if status == SaveStatus::Error {
        match last_error {
            Some(err) => anyhow::bail!("save failed: {err}"),
            None => anyhow::bail!("save refused: form is invalid"),
        }
    }
    Ok(())
}

fn validate(flight: Flight) -> Result<()> {
    let config = FlightEditConfig::load().context("Failed to load config")?;
    let updater: Arc<dyn RecordUpdater> = Arc::new(InMemoryFlightStore::new());
    let mut component = FlightEditComponent::new(updater, &config);
    component.on_changes(Some(&flight));

    print_validity(component.form());
    if !component.form().is_valid() {
        anyhow::bail!("flight is invalid");
    }
    Ok(())
}

fn print_validity(form: &FlightForm) {
    let values = form.current_values();
    for field in FlightField::ALL {
        let value = match field {
            FlightField::Id => values.id.to_string(),
            FlightField::From => values.from.clone(),
            FlightField::To => values.to.clone(),
            FlightField::Date => values.date.clone(),
        };
        let errors = form.errors_of(field);
        if errors.is_empty() {
            println!("  {:<5} {:<35} ok", field, value);
        } else {
            let reasons = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {:<5} {:<35} {}", field, value, reasons);
        }
    }
}

fn config_path() -> Result<()> {
    let path = FlightEditConfig::config_path()?;
    FlightEditConfig::ensure_file(&path)
        .with_context(|| format!("Failed to create config at {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

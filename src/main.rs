use std::error::Error;
use std::sync::Arc;

use actix_web::web;
use log::{error, info};

use coffee_machine::config::Settings;
use coffee_machine::machine::CoffeeMachine;
use coffee_machine::storage::open_store;
use coffee_machine::web::server::{start_web_server, AppState};

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();

    // Initialize logging
    let default_level = settings
        .as_ref()
        .map(|s| s.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_level));

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(settings).await {
        error!("Coffee machine stopped with error: {}", e);
        std::process::exit(1);
    }

    info!("Coffee machine shut down");
}

async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(
        "Starting coffee machine (storage={}, path={})",
        settings.storage_type,
        settings.data_path.display()
    );

    let store = open_store(&settings)?;
    let machine = Arc::new(CoffeeMachine::initialize(settings.capacities(), store.clone()).await?);
    info!("Machine state loaded from {} storage", store.kind());

    let bind_address = settings.bind_address.clone();
    let state = web::Data::new(AppState::new(machine, store, settings)?);

    info!("Coffee machine is now running. Press Ctrl+C to stop.");
    start_web_server(state, &bind_address).await?;

    Ok(())
}

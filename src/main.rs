use std::env;
use std::error::Error;

use clap::Parser;
use zbus::fdo::ObjectManager;
use zbus::Connection;

use padbus::bus::manager::BusManager;
use padbus::cli::{main_cli, Args, Commands};
use padbus::config::BusConfig;
use padbus::constants::{BUS_NAME, BUS_PREFIX};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = Args::parse();
    if !matches!(args.cmd, None | Some(Commands::Run)) {
        return main_cli(args)
            .await
            .map_err(|e| -> Box<dyn Error + Send + Sync> { e.to_string().into() });
    }

    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting PadBus v{}", VERSION);

    let config = BusConfig::load()?;
    log::debug!("Loaded config: {config:?}");

    // Configure the DBus connection
    let connection = Connection::system().await?;

    // Create an ObjectManager to signal when children are added/removed
    let object_manager = ObjectManager {};
    let object_manager_path = String::from(BUS_PREFIX);
    connection
        .object_server()
        .at(object_manager_path, object_manager)
        .await?;

    let mut manager = BusManager::new(&config, Some(connection.clone()));

    // Setup CTRL+C handler. Stopping the bus unplugs every device.
    let client = manager.client();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for shutdown signal: {e}");
            return;
        }
        log::info!("Shutting down");
        if let Err(e) = client.stop().await {
            log::error!("Unable to stop bus: {e}");
        }
    });

    let (manager_result, request_name_result) = tokio::join!(
        // Start the bus and listen on DBus
        manager.run(),
        // Request the named bus
        connection.request_name(BUS_NAME)
    );

    if let Err(e) = request_name_result {
        log::error!("Error in dbus request name operation: {e}");
        return Err(e.into());
    }

    if let Err(e) = manager_result {
        log::error!("Error running the bus: {e}");
        return Err(e);
    }

    log::info!("PadBus stopped");

    Ok(())
}

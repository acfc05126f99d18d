pub mod device;

use std::error::Error;

use clap::{Parser, Subcommand};
use device::{handle_devices, handle_plug_in, handle_unplug};
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use zbus::{names::BusName, Connection};

use crate::bus::ioctl::IoControlCode;
use crate::constants::{BUS_NAME, COMMON_VERSION};
use crate::usb::Family;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the PadBus daemon (default)
    Run,
    /// Show the version of the running bus and its control protocol
    Version,
    /// Plug in a virtual controller and keep it plugged in until Ctrl+C
    PlugIn {
        /// Controller family (xusb, ds4, xgip)
        family: Family,
        /// Non-zero serial number of the new device
        serial: u32,
    },
    /// Unplug a virtual controller owned by this caller
    Unplug {
        /// Serial number of the device
        serial: u32,
    },
    /// List all plugged in devices
    Devices,
    /// List the supported control codes
    Codes,
}

#[derive(Tabled)]
struct CodeRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Output")]
    output: String,
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error>> {
    let Some(cmd) = args.cmd else {
        return Ok(());
    };

    // Listing codes does not need a running bus
    if let Commands::Codes = cmd {
        print_codes();
        return Ok(());
    }

    // Connect to DBus
    let connection = Connection::system().await?;
    if !is_running(&connection).await {
        return Err("PadBus daemon is not currently running".into());
    }

    match cmd {
        Commands::Run | Commands::Codes => (),
        Commands::Version => {
            let bus = crate::dbus::interface::bus::BusInterfaceProxy::new(&connection).await?;
            let version = bus.version().await?;
            println!("Client protocol version: 0x{COMMON_VERSION:04X}");
            println!("Bus protocol version: 0x{version:04X}");
        }
        Commands::PlugIn { family, serial } => handle_plug_in(connection, family, serial).await?,
        Commands::Unplug { serial } => handle_unplug(connection, serial).await?,
        Commands::Devices => handle_devices(connection).await?,
    }

    Ok(())
}

fn print_codes() {
    let rows: Vec<CodeRow> = IoControlCode::supported_codes()
        .into_iter()
        .map(|code| CodeRow {
            code: format!("0x{:08X}", code.code()),
            name: code.name().to_string(),
            output: if code.has_output() { "yes" } else { "no" }.to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Control Codes"));
    println!("{table}");
}

/// Returns true if PadBus is currently running
async fn is_running(conn: &Connection) -> bool {
    let Ok(bus) = BusName::try_from(BUS_NAME) else {
        return false;
    };
    let dbus = zbus::fdo::DBusProxy::new(conn).await.ok();
    let Some(dbus) = dbus else {
        return false;
    };
    dbus.name_has_owner(bus).await.unwrap_or_default()
}

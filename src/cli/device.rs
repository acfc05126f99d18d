use std::error::Error;

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use zbus::Connection;

use crate::bus::status::Status;
use crate::dbus::interface::bus::BusInterfaceProxy;
use crate::dbus::interface::child::{get_dbus_path, ChildInterfaceProxy};
use crate::usb::Family;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: u32,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Hardware Id")]
    hardware_id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "State")]
    state: String,
}

/// Returns an error describing the given status if it is not a success
fn check_status(value: u32) -> Result<(), Box<dyn Error>> {
    match Status::from_u32(value) {
        Some(status) if status.is_success() => Ok(()),
        Some(status) => Err(format!("Bus returned {status}").into()),
        None => Err(format!("Bus returned unknown status 0x{value:08X}").into()),
    }
}

pub async fn handle_plug_in(
    conn: Connection,
    family: Family,
    serial: u32,
) -> Result<(), Box<dyn Error>> {
    let bus = BusInterfaceProxy::new(&conn).await?;
    let status = bus.plug_in(family.to_string(), serial).await?;
    check_status(status)?;
    println!("Plugged in {family} device {serial}. Press Ctrl+C to unplug.");

    // Devices are owned by this connection and are released by the bus if
    // the connection goes away.
    tokio::signal::ctrl_c().await?;

    let status = bus.unplug(serial).await?;
    check_status(status)?;
    println!("Unplugged device {serial}");

    Ok(())
}

pub async fn handle_unplug(conn: Connection, serial: u32) -> Result<(), Box<dyn Error>> {
    let bus = BusInterfaceProxy::new(&conn).await?;
    let status = bus.unplug(serial).await?;
    check_status(status)?;
    println!("Unplugged device {serial}");
    Ok(())
}

pub async fn handle_devices(conn: Connection) -> Result<(), Box<dyn Error>> {
    let bus = BusInterfaceProxy::new(&conn).await?;
    let devices = bus.devices().await?;
    let count = devices.len();

    let mut rows = Vec::with_capacity(count);
    for (serial, family, owner, state) in devices {
        let hardware_id = match ChildInterfaceProxy::builder(&conn)
            .path(get_dbus_path(serial))?
            .build()
            .await
        {
            Ok(child) => child.hardware_id().await.unwrap_or_default(),
            Err(_) => String::new(),
        };
        let owner = if owner.is_empty() {
            "<internal>".to_string()
        } else {
            owner
        };
        rows.push(DeviceRow {
            serial,
            family,
            hardware_id,
            owner,
            state,
        });
    }

    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Devices"));
    println!("{table}");
    println!("Found {count} device(s)");

    Ok(())
}

pub mod interface;

use std::error::Error;

use futures::StreamExt;
use zbus::{fdo::DBusProxy, Connection};

use crate::bus::{client::BusClient, CallerId};

/// Watch for callers leaving the message bus and release every device they
/// own. Runs until the signal stream ends.
pub async fn watch_name_owners(
    conn: Connection,
    client: BusClient,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let proxy = DBusProxy::new(&conn).await?;
    let mut changes = proxy.receive_name_owner_changed().await?;
    log::debug!("Watching for callers leaving the bus");

    while let Some(signal) = changes.next().await {
        let args = match signal.args() {
            Ok(args) => args,
            Err(e) => {
                log::warn!("Failed to parse NameOwnerChanged signal: {e}");
                continue;
            }
        };

        // Only unique names own devices. A new owner means the name is
        // still around.
        let name = args.name().to_string();
        if !name.starts_with(':') || args.new_owner().is_some() {
            continue;
        }

        log::debug!("Caller {name} left the bus");
        if let Err(e) = client.release_owner(CallerId(name)).await {
            log::error!("Failed to release devices of departed caller: {e}");
            break;
        }
    }

    Ok(())
}

use std::{collections::HashMap, error::Error};

use tokio::sync::mpsc;
use zbus::Connection;

use crate::{
    config::BusConfig,
    dbus::interface::{
        bus::BusInterface,
        child::{get_dbus_path, ChildInterface},
        DBusInterfaceManager,
    },
};

use super::{
    client::BusClient, command::BusCommand, dispatcher::Dispatcher, request::Outcome, BusEvent,
};

const BUFFER_SIZE: usize = 2048;

/// Manages the virtual gamepad bus
///
/// The [BusManager] owns the [Dispatcher] and processes every [BusCommand]
/// in the order it was received, so no two operations ever observe a
/// half-updated registry. Enumeration events produced by the dispatcher are
/// announced on DBus as child objects under the children path.
pub struct BusManager {
    /// The DBus connection. Without a connection the bus still works but
    /// children are not announced.
    dbus: Option<Connection>,
    dispatcher: Dispatcher,
    /// The receive side of the channel used to listen for [BusCommand]
    /// messages from clients
    rx: mpsc::Receiver<BusCommand>,
    /// Wraps the transmit side of [rx]. Clones share one request id
    /// sequence.
    client: BusClient,
    /// Announced children keyed by serial
    children: HashMap<u32, DBusInterfaceManager>,
}

impl BusManager {
    pub fn new(config: &BusConfig, dbus: Option<Connection>) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        Self {
            dbus,
            dispatcher: Dispatcher::new(config.registry()),
            rx,
            client: BusClient::new(tx),
            children: HashMap::new(),
        }
    }

    /// Returns a client that can be used to send commands to the bus
    pub fn client(&self) -> BusClient {
        self.client.clone()
    }

    /// Starts listening for [BusCommand] messages and dispatches them until
    /// the bus is stopped
    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(conn) = self.dbus.clone() {
            self.listen_on_dbus(conn).await?;
        }

        log::info!("Bus is running");
        while let Some(cmd) = self.rx.recv().await {
            log::trace!("Received command: {cmd:?}");
            match cmd {
                BusCommand::DeviceControl(request) => {
                    let outcome = self.dispatcher.handle(request);
                    if let Outcome::Deferred(id) = outcome {
                        log::debug!("Request {id} parked");
                    }
                }
                BusCommand::SubmitTransfer {
                    serial,
                    transfer,
                    request,
                } => {
                    self.dispatcher.submit_transfer(serial, transfer, request);
                }
                BusCommand::SelectConfiguration {
                    serial,
                    interfaces,
                    reply,
                } => {
                    let result = self.dispatcher.select_configuration(serial, interfaces);
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send configuration reply: {e:?}");
                    }
                }
                BusCommand::GetDescriptor {
                    serial,
                    descriptor_type,
                    index,
                    length,
                    reply,
                } => {
                    let result = self
                        .dispatcher
                        .get_descriptor(serial, descriptor_type, index, length);
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send descriptor reply: {e:?}");
                    }
                }
                BusCommand::ControlTransfer {
                    serial,
                    setup,
                    data,
                    reply,
                } => {
                    let result = self.dispatcher.control_transfer(serial, setup, &data);
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send control transfer reply: {e:?}");
                    }
                }
                BusCommand::Cancel { id, origin } => {
                    if !self.dispatcher.cancel(id, &origin) {
                        log::debug!("Request {id} was not parked for {:?}", origin.caller());
                    }
                }
                BusCommand::CancelRequests {
                    serial,
                    origin,
                    reply,
                } => {
                    let result = self.dispatcher.cancel_requests(serial, &origin);
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send cancel reply: {e:?}");
                    }
                }
                BusCommand::ReleaseOwner(caller) => {
                    self.dispatcher.release_owner(&caller);
                }
                BusCommand::GetChildren(reply) => {
                    let children = self.dispatcher.children();
                    if let Err(e) = reply.send(children).await {
                        log::error!("Failed to send children: {e:?}");
                    }
                }
                BusCommand::Stop => {
                    let removed = self.dispatcher.shutdown();
                    log::info!("Stopping bus, removed {removed} device(s)");
                    self.announce().await;
                    break;
                }
            }
            self.announce().await;
        }

        self.children.clear();
        log::info!("Bus stopped");

        Ok(())
    }

    /// Announce arrivals and removals produced by the last command
    async fn announce(&mut self) {
        for event in self.dispatcher.take_events() {
            match event {
                BusEvent::ChildArrived {
                    serial,
                    family,
                    identity,
                } => {
                    log::info!(
                        "Device {serial} arrived as {family} {}",
                        identity.hardware_id
                    );
                    let Some(conn) = self.dbus.clone() else {
                        continue;
                    };
                    let path = get_dbus_path(serial);
                    let mut ifaces = match DBusInterfaceManager::new(conn, path) {
                        Ok(ifaces) => ifaces,
                        Err(e) => {
                            log::error!("Failed to create interfaces for device {serial}: {e}");
                            continue;
                        }
                    };
                    let iface = ChildInterface::new(serial, family, identity);
                    if let Err(e) = ifaces.register(iface).await {
                        log::error!("Failed to announce device {serial}: {e}");
                        continue;
                    }
                    self.children.insert(serial, ifaces);
                }
                BusEvent::ChildRemoved { serial, drained } => {
                    log::info!("Device {serial} removed, completed {drained} parked request(s)");
                    // Dropping the interfaces withdraws them from DBus
                    self.children.remove(&serial);
                }
            }
        }
    }

    /// Serve the bus interface and watch for departing callers
    async fn listen_on_dbus(&self, conn: Connection) -> Result<(), Box<dyn Error + Send + Sync>> {
        let iface = BusInterface::new(self.client());
        conn.object_server()
            .at(crate::constants::BUS_PATH, iface)
            .await?;

        let client = self.client();
        tokio::task::spawn(async move {
            if let Err(e) = crate::dbus::watch_name_owners(conn, client).await {
                log::error!("Failed to watch for departing callers: {e}");
            }
        });

        Ok(())
    }
}

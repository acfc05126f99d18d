pub mod bus;
pub mod child;


use std::collections::HashMap;

use thiserror::Error;
use zbus::{names::InterfaceName, object_server::Interface, zvariant::ObjectPath, Connection};

#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("invalid object path: {0}")]
    PathError(String),
    #[error("failed to register interface: {0}")]
    RegisterError(#[from] zbus::Error),
}

/// Owns the dbus interfaces served at one object path. Dropping the manager
/// withdraws every interface it registered, which also emits the
/// corresponding `InterfacesRemoved` signal from the object manager.
pub struct DBusInterfaceManager {
    dbus: Connection,
    dbus_path: String,
    dbus_ifaces: HashMap<InterfaceName<'static>, UnregisterFn>,
}

impl DBusInterfaceManager {
    /// Creates a new interface manager for the given object path
    pub fn new(dbus: Connection, path: String) -> Result<Self, InterfaceError> {
        if ObjectPath::try_from(path.as_str()).is_err() {
            return Err(InterfaceError::PathError(path));
        }
        Ok(Self {
            dbus,
            dbus_path: path,
            dbus_ifaces: HashMap::new(),
        })
    }

    /// Returns the dbus path used for all managed interfaces
    pub fn path(&self) -> &str {
        self.dbus_path.as_str()
    }

    /// Serve the given interface at the managed path
    pub async fn register<I>(&mut self, iface: I) -> Result<(), InterfaceError>
    where
        I: Interface + Unregisterable,
    {
        let iface_name = I::name();
        let object_server = self.dbus.object_server();
        object_server.at(self.dbus_path.as_str(), iface).await?;
        log::debug!("Started dbus interface `{iface_name}` on `{}`", self.dbus_path);
        self.dbus_ifaces.insert(iface_name, &I::unregister);
        Ok(())
    }

    /// Withdraw every registered interface
    pub fn unregister_all(&mut self) {
        for (_, unregister) in self.dbus_ifaces.drain() {
            unregister(self.dbus.clone(), self.dbus_path.clone());
        }
    }
}

impl Drop for DBusInterfaceManager {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

/// Defines how to withdraw a dbus interface. Interfaces only need an empty
/// implementation of this trait to be managed by a [DBusInterfaceManager].
pub trait Unregisterable {
    fn unregister(dbus: Connection, path: String)
    where
        Self: Interface,
        Self: Sized,
    {
        tokio::task::spawn(async move {
            let iface_name = Self::name();
            let object_server = dbus.object_server();
            if let Err(e) = object_server.remove::<Self, String>(path.clone()).await {
                log::debug!("Failed to stop interface `{iface_name}` on `{path}`: {e}");
                return;
            }
            log::debug!("Stopped dbus interface `{iface_name}` on `{path}`");
        });
    }
}

type UnregisterFn = &'static (dyn Fn(Connection, String) + Send + Sync);

use zbus::fdo;
use zbus_macros::interface;

use crate::{
    dbus::interface::Unregisterable,
    usb::{ChildIdentity, Family},
};

/// Announces a plugged in child device to the consuming stack
pub struct ChildInterface {
    serial: u32,
    family: Family,
    identity: ChildIdentity,
}

impl ChildInterface {
    pub fn new(serial: u32, family: Family, identity: ChildIdentity) -> Self {
        Self {
            serial,
            family,
            identity,
        }
    }
}

#[interface(
    name = "org.shadowblip.PadBus.Child",
    proxy(default_service = "org.shadowblip.PadBus")
)]
impl ChildInterface {
    /// Serial number assigned by the application that plugged the device in
    #[zbus(property)]
    async fn serial(&self) -> fdo::Result<u32> {
        Ok(self.serial)
    }

    /// Controller family of the device (e.g. "xusb")
    #[zbus(property)]
    async fn family(&self) -> fdo::Result<String> {
        Ok(self.family.to_string())
    }

    #[zbus(property)]
    async fn hardware_id(&self) -> fdo::Result<String> {
        Ok(self.identity.hardware_id.clone())
    }

    #[zbus(property)]
    async fn compatible_ids(&self) -> fdo::Result<Vec<String>> {
        Ok(self.identity.compatible_ids.clone())
    }

    #[zbus(property)]
    async fn description(&self) -> fdo::Result<String> {
        Ok(self.identity.description.clone())
    }

    #[zbus(property)]
    async fn vendor_id(&self) -> fdo::Result<u16> {
        Ok(self.identity.vendor_id)
    }

    #[zbus(property)]
    async fn product_id(&self) -> fdo::Result<u16> {
        Ok(self.identity.product_id)
    }
}

impl Unregisterable for ChildInterface {}

/// Returns the dbus path of the child with the given serial
pub fn get_dbus_path(serial: u32) -> String {
    format!("{}/child{serial}", crate::constants::CHILDREN_PATH)
}

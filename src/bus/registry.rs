use std::collections::HashMap;

use thiserror::Error;

use crate::usb::{create_target, Family};

use super::{device::ChildDevice, status::Status, CallerId, Origin};

/// Possible errors of registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("serial number 0 is reserved")]
    InvalidSerial,
    #[error("device with serial {0} already exists")]
    Duplicate(u32),
    #[error("no device with serial {0}")]
    NotFound(u32),
    #[error("caller does not own device {0}")]
    AccessDenied(u32),
    #[error("child limit of {0} reached")]
    LimitReached(usize),
}

impl From<RegistryError> for Status {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidSerial => Status::InvalidParameter,
            RegistryError::Duplicate(_) => Status::ObjectNameCollision,
            RegistryError::NotFound(_) => Status::NoSuchDevice,
            RegistryError::AccessDenied(_) => Status::AccessDenied,
            RegistryError::LimitReached(_) => Status::InsufficientResources,
        }
    }
}

/// Mapping of serial numbers to live child devices
#[derive(Debug, Default)]
pub struct ChildRegistry {
    children: HashMap<u32, ChildDevice>,
    max_children: Option<usize>,
    /// Vendor and product ids used when a plug-in request leaves them unset
    default_ids: HashMap<Family, (u16, u16)>,
}

impl ChildRegistry {
    pub fn new(max_children: Option<usize>) -> Self {
        Self {
            children: HashMap::new(),
            max_children,
            default_ids: HashMap::new(),
        }
    }

    /// Override the default vendor and product id of the given family
    pub fn set_default_ids(&mut self, family: Family, vendor_id: u16, product_id: u16) {
        self.default_ids.insert(family, (vendor_id, product_id));
    }

    /// Create and register a new child device
    pub fn plug_in(
        &mut self,
        serial: u32,
        family: Family,
        vendor_id: u16,
        product_id: u16,
        origin: &Origin,
    ) -> Result<&ChildDevice, RegistryError> {
        if serial == 0 {
            return Err(RegistryError::InvalidSerial);
        }
        if self.children.contains_key(&serial) {
            return Err(RegistryError::Duplicate(serial));
        }
        if let Some(max) = self.max_children {
            if self.children.len() >= max {
                return Err(RegistryError::LimitReached(max));
            }
        }

        let (default_vid, default_pid) = self.default_ids.get(&family).copied().unwrap_or((0, 0));
        let vendor_id = if vendor_id == 0 { default_vid } else { vendor_id };
        let product_id = if product_id == 0 { default_pid } else { product_id };

        let target = create_target(family, serial, vendor_id, product_id);
        let owner = origin.caller().cloned();
        log::info!(
            "Plugging in {family} device {serial} owned by {}",
            owner.as_ref().map(|o| o.0.as_str()).unwrap_or("<internal>")
        );
        let device = ChildDevice::new(serial, owner, target);
        Ok(self.children.entry(serial).or_insert(device))
    }

    /// Remove the given device after draining its queues. Returns the number
    /// of drained requests.
    pub fn unplug(&mut self, serial: u32, origin: &Origin) -> Result<usize, RegistryError> {
        self.lookup_owned(serial, origin)?;
        let Some(mut device) = self.children.remove(&serial) else {
            return Err(RegistryError::NotFound(serial));
        };
        let drained = device.remove();
        log::info!("Unplugged device {serial}, drained {drained} request(s)");
        Ok(drained)
    }

    pub fn lookup(&mut self, serial: u32) -> Result<&mut ChildDevice, RegistryError> {
        self.children
            .get_mut(&serial)
            .ok_or(RegistryError::NotFound(serial))
    }

    /// Look up a device and check that the given origin may operate on it
    pub fn lookup_owned(
        &mut self,
        serial: u32,
        origin: &Origin,
    ) -> Result<&mut ChildDevice, RegistryError> {
        let device = self.lookup(serial)?;
        if !device.is_owned_by(origin) {
            log::warn!(
                "Caller {:?} does not own device {serial} (owner {:?})",
                origin.caller(),
                device.owner()
            );
            return Err(RegistryError::AccessDenied(serial));
        }
        Ok(device)
    }

    /// Unplug every device owned by the given caller. Returns the serial and
    /// number of drained requests of each removed device.
    pub fn release_owner(&mut self, caller: &CallerId) -> Vec<(u32, usize)> {
        let serials: Vec<u32> = self
            .children
            .values()
            .filter(|device| device.owner() == Some(caller))
            .map(|device| device.serial())
            .collect();
        self.remove_all(serials)
    }

    /// Unplug every device. Returns the serial and number of drained
    /// requests of each removed device.
    pub fn clear(&mut self) -> Vec<(u32, usize)> {
        let serials = self.serials();
        self.remove_all(serials)
    }

    fn remove_all(&mut self, mut serials: Vec<u32>) -> Vec<(u32, usize)> {
        serials.sort_unstable();
        serials
            .into_iter()
            .filter_map(|serial| {
                let mut device = self.children.remove(&serial)?;
                let drained = device.remove();
                log::info!("Removed device {serial}, drained {drained} request(s)");
                Some((serial, drained))
            })
            .collect()
    }

    /// Serial numbers of all live devices in ascending order
    pub fn serials(&self) -> Vec<u32> {
        let mut serials: Vec<u32> = self.children.keys().copied().collect();
        serials.sort_unstable();
        serials
    }

    pub fn devices(&self) -> impl Iterator<Item = &ChildDevice> {
        self.children.values()
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut ChildDevice> {
        self.children.values_mut()
    }

    pub fn contains(&self, serial: u32) -> bool {
        self.children.contains_key(&serial)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

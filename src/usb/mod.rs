pub mod descriptor;
pub mod ds4;
pub mod urb;
pub mod xgip;
pub mod xusb;

use std::{fmt::Display, str::FromStr};

use packed_struct::PackingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::{
    channel::DeviceChannel,
    request::{Outcome, PendingRequest},
    status::Status,
};

use self::{
    descriptor::{SetupPacket, UsbDeviceDescriptor},
    ds4::{report::Ds4Report, Ds4Target},
    urb::{InterfaceInformation, InterruptTransfer, PipeHandle},
    xgip::{report::XgipReport, XgipTarget},
    xusb::{report::XusbReport, XusbTarget},
};

/// Possible errors of the USB emulation layer
#[derive(Error, Debug)]
pub enum UsbError {
    #[error("operation is not supported by this device")]
    NotSupported,
    #[error("invalid pipe handle: {0}")]
    InvalidPipe(PipeHandle),
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),
    #[error("expected {0} interfaces, got {1}")]
    InterfaceCount(usize, usize),
    #[error("failed to pack data: {0}")]
    Packing(#[from] PackingError),
}

impl From<UsbError> for Status {
    fn from(err: UsbError) -> Self {
        match err {
            UsbError::NotSupported => Status::NotSupported,
            UsbError::InvalidPipe(_) => Status::InvalidParameter,
            UsbError::InvalidBuffer(_) => Status::InvalidParameter,
            UsbError::InterfaceCount(_, _) => Status::InvalidParameter,
            UsbError::Packing(_) => Status::InvalidParameter,
        }
    }
}

/// Controller family of a child device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Xbox 360 wired controller
    Xusb,
    /// DualShock 4 wired controller
    Ds4,
    /// Xbox One wired controller
    Xgip,
}

impl Family {
    /// Returns the family for the given wire target type
    pub fn from_target_type(value: u32) -> Option<Family> {
        match value {
            0 => Some(Family::Xusb),
            1 => Some(Family::Xgip),
            2 => Some(Family::Ds4),
            _ => None,
        }
    }

    /// Wire target type of this family
    pub fn target_type(&self) -> u32 {
        match self {
            Family::Xusb => 0,
            Family::Xgip => 1,
            Family::Ds4 => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::Xusb => "xusb",
            Family::Ds4 => "ds4",
            Family::Xgip => "xgip",
        }
    }

    /// Default vendor and product id of this family
    pub fn default_ids(&self) -> (u16, u16) {
        match self {
            Family::Xusb => (xusb::VENDOR_ID, xusb::PRODUCT_ID),
            Family::Ds4 => (ds4::VENDOR_ID, ds4::PRODUCT_ID),
            Family::Xgip => (xgip::VENDOR_ID, xgip::PRODUCT_ID),
        }
    }

    pub fn all() -> [Family; 3] {
        [Family::Xusb, Family::Ds4, Family::Xgip]
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xusb" | "xb360" | "xbox360" => Ok(Family::Xusb),
            "ds4" | "dualshock4" => Ok(Family::Ds4),
            "xgip" | "xbox-one" | "xboxone" => Ok(Family::Xgip),
            _ => Err(format!("unknown controller family: {s}")),
        }
    }
}

/// Enumeration identity of a child device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildIdentity {
    pub hardware_id: String,
    pub compatible_ids: Vec<String>,
    pub description: String,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl ChildIdentity {
    pub fn new(vendor_id: u16, product_id: u16, compatible_ids: &[&str], description: &str) -> Self {
        Self {
            hardware_id: format!("USB\\VID_{vendor_id:04X}&PID_{product_id:04X}"),
            compatible_ids: compatible_ids.iter().map(|id| id.to_string()).collect(),
            description: description.to_string(),
            vendor_id,
            product_id,
        }
    }
}

/// Input report submitted by an application for one of the families
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetReport {
    Xusb(XusbReport),
    Ds4(Ds4Report),
    Xgip(XgipReport),
}

impl TargetReport {
    pub fn family(&self) -> Family {
        match self {
            TargetReport::Xusb(_) => Family::Xusb,
            TargetReport::Ds4(_) => Family::Ds4,
            TargetReport::Xgip(_) => Family::Xgip,
        }
    }
}

/// Emulated USB function of a child device. Each controller family
/// answers descriptor queries and moves reports between the consumer's
/// transfers and the application through the device channel.
pub trait UsbTarget: std::fmt::Debug + Send + Sync {
    fn family(&self) -> Family;

    /// Enumeration identity of the device
    fn identity(&self) -> ChildIdentity;

    fn device_descriptor(&self) -> UsbDeviceDescriptor;

    /// Full configuration descriptor including interface, class and
    /// endpoint descriptors
    fn configuration_descriptor(&self) -> &'static [u8];

    /// HID report descriptor, if the device is a HID device
    fn report_descriptor(&self) -> Option<&'static [u8]> {
        None
    }

    /// Manufacturer and product strings
    fn strings(&self) -> (&'static str, &'static str);

    /// Fill in the interfaces of the selected configuration
    fn select_configuration(
        &mut self,
        interfaces: &mut [InterfaceInformation],
    ) -> Result<(), UsbError>;

    /// Convert the submitted report into the device's IN packet and hand it
    /// to the channel
    fn submit_report(
        &mut self,
        report: TargetReport,
        channel: &mut DeviceChannel,
    ) -> Result<(), UsbError>;

    /// Submit a raw interrupt packet
    fn submit_interrupt(
        &mut self,
        _packet: &[u8],
        _channel: &mut DeviceChannel,
    ) -> Result<(), UsbError> {
        Err(UsbError::NotSupported)
    }

    /// Returns the user index assigned by the host, if any
    fn user_index(&self) -> Result<Option<u8>, UsbError> {
        Err(UsbError::NotSupported)
    }

    /// Handle a bulk or interrupt transfer issued by the consumer. IN
    /// transfers may be parked in the channel.
    fn transfer(
        &mut self,
        transfer: InterruptTransfer,
        request: PendingRequest,
        channel: &mut DeviceChannel,
    ) -> Result<Outcome, UsbError>;

    /// Handle a class specific control transfer
    fn control_transfer(&mut self, _setup: &SetupPacket, _data: &[u8]) -> Result<Vec<u8>, UsbError> {
        Err(UsbError::NotSupported)
    }
}

/// Create the emulated USB function for the given family. Vendor or product
/// id 0 selects the family default.
pub fn create_target(family: Family, serial: u32, vendor_id: u16, product_id: u16) -> Box<dyn UsbTarget> {
    let (default_vid, default_pid) = family.default_ids();
    let vendor_id = if vendor_id == 0 { default_vid } else { vendor_id };
    let product_id = if product_id == 0 { default_pid } else { product_id };
    match family {
        Family::Xusb => Box::new(XusbTarget::new(serial, vendor_id, product_id)),
        Family::Ds4 => Box::new(Ds4Target::new(serial, vendor_id, product_id)),
        Family::Xgip => Box::new(XgipTarget::new(serial, vendor_id, product_id)),
    }
}

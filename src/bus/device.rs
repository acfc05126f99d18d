use std::fmt::Display;

use packed_struct::prelude::*;

use crate::usb::{
    descriptor::{
        copy_descriptor, language_descriptor, string_descriptor, SetupPacket,
        CONFIGURATION_DESCRIPTOR_TYPE, DEVICE_DESCRIPTOR_TYPE, REPORT_DESCRIPTOR_TYPE,
        STRING_DESCRIPTOR_TYPE,
    },
    urb::{InterfaceInformation, InterruptTransfer},
    ChildIdentity, Family, TargetReport, UsbError, UsbTarget,
};

use super::{
    channel::DeviceChannel,
    request::{Outcome, PendingRequest, RequestId},
    CallerId, Origin,
};

/// Lifecycle of a child device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Plugged in but not yet configured by the consumer
    Created,
    /// Configured by the consumer or assigned a user index
    Active,
    /// Unplugged. All parked requests have been drained.
    Removed,
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceState::Created => "created",
            DeviceState::Active => "active",
            DeviceState::Removed => "removed",
        };
        write!(f, "{name}")
    }
}

/// Summary of a live child device
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    pub serial: u32,
    pub family: Family,
    pub owner: Option<CallerId>,
    pub state: DeviceState,
    pub user_index: Option<u8>,
    pub identity: ChildIdentity,
}

/// A virtual controller plugged into the bus
#[derive(Debug)]
pub struct ChildDevice {
    serial: u32,
    owner: Option<CallerId>,
    state: DeviceState,
    target: Box<dyn UsbTarget>,
    channel: DeviceChannel,
}

impl ChildDevice {
    pub fn new(serial: u32, owner: Option<CallerId>, target: Box<dyn UsbTarget>) -> Self {
        Self {
            serial,
            owner,
            state: DeviceState::Created,
            target,
            channel: DeviceChannel::new(),
        }
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn family(&self) -> Family {
        self.target.family()
    }

    pub fn owner(&self) -> Option<&CallerId> {
        self.owner.as_ref()
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn identity(&self) -> ChildIdentity {
        self.target.identity()
    }

    pub fn channel(&self) -> &DeviceChannel {
        &self.channel
    }

    /// Returns true if the given origin may operate on this device
    pub fn is_owned_by(&self, origin: &Origin) -> bool {
        match origin {
            Origin::Internal => true,
            Origin::Application(caller) => self.owner.as_ref() == Some(caller),
        }
    }

    pub fn summary(&self) -> ChildSummary {
        ChildSummary {
            serial: self.serial,
            family: self.family(),
            owner: self.owner.clone(),
            state: self.state,
            user_index: self.target.user_index().ok().flatten(),
            identity: self.identity(),
        }
    }

    /// Promote the device to active if the host has started using it
    fn refresh_state(&mut self) {
        if self.state != DeviceState::Created {
            return;
        }
        if let Ok(Some(index)) = self.target.user_index() {
            log::debug!("Device {} is active with user index {index}", self.serial);
            self.state = DeviceState::Active;
        }
    }

    pub fn submit_report(&mut self, report: TargetReport) -> Result<(), UsbError> {
        self.target.submit_report(report, &mut self.channel)
    }

    pub fn submit_interrupt(&mut self, packet: &[u8]) -> Result<(), UsbError> {
        self.target.submit_interrupt(packet, &mut self.channel)
    }

    pub fn request_notification(&mut self, request: PendingRequest) -> Outcome {
        self.channel.request_notification(request)
    }

    pub fn user_index(&self) -> Result<Option<u8>, UsbError> {
        self.target.user_index()
    }

    pub fn select_configuration(
        &mut self,
        interfaces: &mut [InterfaceInformation],
    ) -> Result<(), UsbError> {
        self.target.select_configuration(interfaces)?;
        if self.state == DeviceState::Created {
            log::debug!("Device {} was configured", self.serial);
            self.state = DeviceState::Active;
        }
        Ok(())
    }

    pub fn transfer(
        &mut self,
        transfer: InterruptTransfer,
        request: PendingRequest,
    ) -> Result<Outcome, UsbError> {
        let outcome = self.target.transfer(transfer, request, &mut self.channel)?;
        self.refresh_state();
        Ok(outcome)
    }

    pub fn control_transfer(&mut self, setup: &SetupPacket, data: &[u8]) -> Result<Vec<u8>, UsbError> {
        self.target.control_transfer(setup, data)
    }

    /// Returns up to `length` bytes of the requested descriptor
    pub fn get_descriptor(
        &self,
        descriptor_type: u8,
        index: u8,
        length: usize,
    ) -> Result<Vec<u8>, UsbError> {
        let descriptor = match descriptor_type {
            DEVICE_DESCRIPTOR_TYPE => self.target.device_descriptor().pack()?.to_vec(),
            CONFIGURATION_DESCRIPTOR_TYPE => self.target.configuration_descriptor().to_vec(),
            STRING_DESCRIPTOR_TYPE => {
                let (manufacturer, product) = self.target.strings();
                match index {
                    0 => language_descriptor(),
                    1 => string_descriptor(manufacturer),
                    2 => string_descriptor(product),
                    3 => string_descriptor(format!("{:08X}", self.serial).as_str()),
                    _ => return Err(UsbError::NotSupported),
                }
            }
            REPORT_DESCRIPTOR_TYPE => {
                let Some(report) = self.target.report_descriptor() else {
                    return Err(UsbError::NotSupported);
                };
                report.to_vec()
            }
            _ => return Err(UsbError::NotSupported),
        };
        Ok(copy_descriptor(&descriptor, length))
    }

    pub fn cancel(&mut self, id: RequestId, origin: &Origin) -> bool {
        self.channel.cancel(id, origin)
    }

    pub fn cancel_from(&mut self, origin: &Origin) -> usize {
        self.channel.cancel_from(origin)
    }

    /// Drain every parked request with a device removed status and mark the
    /// device as removed. Returns the number of drained requests.
    pub fn remove(&mut self) -> usize {
        let drained = self.channel.drain();
        self.state = DeviceState::Removed;
        drained
    }
}

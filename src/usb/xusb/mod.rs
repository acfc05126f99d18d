//! Emulation of a wired Xbox 360 controller
pub mod descriptor;
pub mod report;

#[cfg(test)]
pub mod xusb_test;

use packed_struct::prelude::*;

use crate::bus::{
    channel::DeviceChannel,
    protocol::XusbRequestNotification,
    request::{Completion, Outcome, PendingRequest},
};

use self::{
    descriptor::{CAPABILITIES_PACKET, CONFIGURATION_DESCRIPTOR, INIT_PACKETS},
    report::{XusbInterruptInPacket, XUSB_LEDSET_SIZE, XUSB_RUMBLE_SIZE},
};

use super::{
    descriptor::UsbDeviceDescriptor,
    urb::{InterfaceInformation, InterruptTransfer, PipeInformation, TransferDirection},
    ChildIdentity, Family, TargetReport, UsbError, UsbTarget,
};

pub const VENDOR_ID: u16 = 0x045E;
pub const PRODUCT_ID: u16 = 0x028E;

/// Number of interfaces in the configuration
pub const INTERFACE_COUNT: usize = 4;

const PACKET_SIZE: u16 = 0x20;

/// Endpoint carrying input reports
const DATA_PIPE_IN: u8 = 0x81;
/// Endpoint carrying LED and rumble commands
const DATA_PIPE_OUT: u8 = 0x01;
/// Endpoint answering the capabilities query once
const CONTROL_PIPE_IN: u8 = 0x83;

/// LED value sent when no user index is assigned
const NO_LED: u8 = 0xFF;

#[derive(Debug)]
pub struct XusbTarget {
    serial: u32,
    vendor_id: u16,
    product_id: u16,
    /// Number of init packets already returned on the data pipe
    init_stage: usize,
    reported_capabilities: bool,
    led_number: Option<u8>,
    large_motor: u8,
    small_motor: u8,
}

impl XusbTarget {
    pub fn new(serial: u32, vendor_id: u16, product_id: u16) -> Self {
        Self {
            serial,
            vendor_id,
            product_id,
            init_stage: 0,
            reported_capabilities: false,
            led_number: None,
            large_motor: 0,
            small_motor: 0,
        }
    }

    /// Returns true once every init packet was sent to the host
    pub fn is_initialized(&self) -> bool {
        self.init_stage >= INIT_PACKETS.len()
    }

    fn notification(&self) -> Result<Vec<u8>, UsbError> {
        let mut notification = XusbRequestNotification::new(self.serial);
        notification.large_motor = self.large_motor;
        notification.small_motor = self.small_motor;
        notification.led_number = self.led_number.unwrap_or(NO_LED);
        Ok(notification.pack()?.to_vec())
    }

    /// Process an OUT packet written by the host on the data pipe
    fn handle_output(&mut self, data: &[u8], channel: &mut DeviceChannel) -> Result<(), UsbError> {
        log::trace!("Got XUSB output packet: {data:02X?}");
        let changed = match data {
            [0x01, 0x03, led] if data.len() == XUSB_LEDSET_SIZE => {
                let index = match *led {
                    0x02..=0x05 => Some(*led - 0x02),
                    0x06..=0x09 => Some(*led - 0x06),
                    _ => None,
                };
                let Some(index) = index else {
                    log::debug!("Ignoring LED animation 0x{led:02X}");
                    return Ok(());
                };
                log::info!("Device {} was assigned user index {index}", self.serial);
                self.led_number = Some(index);
                true
            }
            [0x00, 0x08, _, large, small, ..] if data.len() == XUSB_RUMBLE_SIZE => {
                let changed = self.large_motor != *large || self.small_motor != *small;
                self.large_motor = *large;
                self.small_motor = *small;
                changed
            }
            _ => {
                log::debug!("Ignoring unknown XUSB output packet: {data:02X?}");
                false
            }
        };

        if changed {
            channel.submit_notification(self.notification()?);
        }

        Ok(())
    }
}

impl UsbTarget for XusbTarget {
    fn family(&self) -> Family {
        Family::Xusb
    }

    fn identity(&self) -> ChildIdentity {
        ChildIdentity::new(
            self.vendor_id,
            self.product_id,
            &[
                "USB\\MS_COMP_XUSB10",
                "USB\\Class_FF&SubClass_5D&Prot_01",
                "USB\\Class_FF&SubClass_5D",
                "USB\\Class_FF",
            ],
            "Virtual Xbox 360 Controller",
        )
    }

    fn device_descriptor(&self) -> UsbDeviceDescriptor {
        UsbDeviceDescriptor {
            device_class: 0xFF,
            device_subclass: 0xFF,
            device_protocol: 0xFF,
            max_packet_size0: 0x08,
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            bcd_device: 0x0114,
            manufacturer: 0x01,
            product: 0x02,
            serial_number: 0x03,
            ..Default::default()
        }
    }

    fn configuration_descriptor(&self) -> &'static [u8] {
        &CONFIGURATION_DESCRIPTOR
    }

    fn strings(&self) -> (&'static str, &'static str) {
        ("©Microsoft Corporation", "Controller")
    }

    fn select_configuration(
        &mut self,
        interfaces: &mut [InterfaceInformation],
    ) -> Result<(), UsbError> {
        let [gamepad, audio, plugin, security] = interfaces else {
            return Err(UsbError::InterfaceCount(INTERFACE_COUNT, interfaces.len()));
        };

        gamepad.fill(
            0xFF,
            0x5D,
            0x01,
            vec![
                PipeInformation::interrupt(DATA_PIPE_IN, PACKET_SIZE, 0x04),
                PipeInformation::interrupt(DATA_PIPE_OUT, PACKET_SIZE, 0x08),
            ],
        );
        audio.fill(
            0xFF,
            0x5D,
            0x03,
            vec![
                PipeInformation::interrupt(0x82, PACKET_SIZE, 0x04),
                PipeInformation::interrupt(0x02, PACKET_SIZE, 0x08),
                PipeInformation::interrupt(CONTROL_PIPE_IN, PACKET_SIZE, 0x08),
                PipeInformation::interrupt(0x03, PACKET_SIZE, 0x08),
            ],
        );
        plugin.fill(
            0xFF,
            0x5D,
            0x02,
            vec![PipeInformation::interrupt(0x84, PACKET_SIZE, 0x04)],
        );
        security.fill(0xFF, 0xFD, 0x13, vec![]);

        Ok(())
    }

    fn submit_report(
        &mut self,
        report: TargetReport,
        channel: &mut DeviceChannel,
    ) -> Result<(), UsbError> {
        let TargetReport::Xusb(report) = report else {
            return Err(UsbError::NotSupported);
        };
        let packet = XusbInterruptInPacket::new(report).pack()?;
        log::trace!("Submitting XUSB packet: {packet:02X?}");
        channel.submit_report(packet.to_vec());
        Ok(())
    }

    fn user_index(&self) -> Result<Option<u8>, UsbError> {
        Ok(self.led_number)
    }

    fn transfer(
        &mut self,
        transfer: InterruptTransfer,
        request: PendingRequest,
        channel: &mut DeviceChannel,
    ) -> Result<Outcome, UsbError> {
        match (transfer.direction(), transfer.endpoint()) {
            (TransferDirection::In, DATA_PIPE_IN) => {
                if let Some(packet) = INIT_PACKETS.get(self.init_stage) {
                    log::debug!("Sending XUSB init packet {}", self.init_stage);
                    self.init_stage += 1;
                    return Ok(Outcome::Immediate(Completion::success(packet.to_vec())));
                }
                Ok(channel.enqueue_pending_transfer(request))
            }
            (TransferDirection::In, CONTROL_PIPE_IN) => {
                if !self.reported_capabilities {
                    self.reported_capabilities = true;
                    return Ok(Outcome::Immediate(Completion::success(
                        CAPABILITIES_PACKET.to_vec(),
                    )));
                }
                Ok(channel.hold(request))
            }
            (TransferDirection::In, 0x82 | 0x84) => Ok(channel.hold(request)),
            (TransferDirection::Out, DATA_PIPE_OUT) => {
                self.handle_output(&transfer.buffer, channel)?;
                Ok(Outcome::Immediate(Completion::success(Vec::new())))
            }
            (TransferDirection::Out, 0x02 | 0x03) => {
                Ok(Outcome::Immediate(Completion::success(Vec::new())))
            }
            _ => Err(UsbError::InvalidPipe(transfer.pipe)),
        }
    }
}

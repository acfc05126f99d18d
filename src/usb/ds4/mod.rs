//! Emulation of a wired DualShock 4 controller
pub mod descriptor;
pub mod report;


use packed_struct::prelude::*;

use crate::bus::{
    channel::DeviceChannel,
    protocol::Ds4RequestNotification,
    request::{Completion, Outcome, PendingRequest},
};

use self::{
    descriptor::{
        firmware_info_report, pairing_info_report, CALIBRATION_REPORT, CONFIGURATION_DESCRIPTOR,
        REPORT_DESCRIPTOR,
    },
    report::{
        input_report, Ds4OutputReport, FEATURE_REPORT_CALIBRATION, FEATURE_REPORT_FIRMWARE_INFO,
        FEATURE_REPORT_PAIRING_INFO, FEATURE_REPORT_SET_HOST_MAC, OUTPUT_REPORT_USB,
    },
};

use super::{
    descriptor::{hid_report_type, hid_request, SetupPacket, UsbDeviceDescriptor},
    urb::{InterfaceInformation, InterruptTransfer, PipeInformation, TransferDirection},
    ChildIdentity, Family, TargetReport, UsbError, UsbTarget,
};

pub const VENDOR_ID: u16 = 0x054C;
pub const PRODUCT_ID: u16 = 0x05C4;

const PACKET_SIZE: u16 = 0x40;
const INTERVAL: u8 = 0x05;

const PIPE_IN: u8 = 0x84;
const PIPE_OUT: u8 = 0x03;

/// Smallest output report that carries rumble and lightbar values
const OUTPUT_REPORT_MIN_SIZE: usize = 11;

#[derive(Debug)]
pub struct Ds4Target {
    serial: u32,
    vendor_id: u16,
    product_id: u16,
    device_mac: [u8; 6],
    host_mac: [u8; 6],
}

impl Ds4Target {
    pub fn new(serial: u32, vendor_id: u16, product_id: u16) -> Self {
        Self {
            serial,
            vendor_id,
            product_id,
            device_mac: device_mac(serial),
            host_mac: [0; 6],
        }
    }

    pub fn device_mac(&self) -> [u8; 6] {
        self.device_mac
    }

    pub fn host_mac(&self) -> [u8; 6] {
        self.host_mac
    }

    /// Process an output report written by the host
    fn handle_output(&mut self, data: &[u8], channel: &mut DeviceChannel) -> Result<(), UsbError> {
        if data.len() < OUTPUT_REPORT_MIN_SIZE || data[0] != OUTPUT_REPORT_USB {
            log::debug!("Ignoring DS4 output packet: {data:02X?}");
            return Ok(());
        }
        let mut buffer = [0; 32];
        let length = data.len().min(buffer.len());
        buffer[..length].copy_from_slice(&data[..length]);
        let output = Ds4OutputReport::unpack(&buffer)?;
        log::trace!("Got DS4 output report: {output:?}");

        let mut notification = Ds4RequestNotification::new(self.serial);
        notification.large_motor = output.large_motor;
        notification.small_motor = output.small_motor;
        notification.red = output.red;
        notification.green = output.green;
        notification.blue = output.blue;
        channel.submit_notification(notification.pack()?.to_vec());

        Ok(())
    }
}

/// Derive a stable locally administered device address from the serial
fn device_mac(serial: u32) -> [u8; 6] {
    let bytes = serial.to_be_bytes();
    [0x02, 0x4C, bytes[0], bytes[1], bytes[2], bytes[3]]
}

impl UsbTarget for Ds4Target {
    fn family(&self) -> Family {
        Family::Ds4
    }

    fn identity(&self) -> ChildIdentity {
        ChildIdentity::new(
            self.vendor_id,
            self.product_id,
            &[
                "USB\\Class_03&SubClass_00&Prot_00",
                "USB\\Class_03&SubClass_00",
                "USB\\Class_03",
            ],
            "Virtual DualShock 4 Controller",
        )
    }

    fn device_descriptor(&self) -> UsbDeviceDescriptor {
        UsbDeviceDescriptor {
            max_packet_size0: 0x40,
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            bcd_device: 0x0100,
            manufacturer: 0x01,
            product: 0x02,
            serial_number: 0x00,
            ..Default::default()
        }
    }

    fn configuration_descriptor(&self) -> &'static [u8] {
        &CONFIGURATION_DESCRIPTOR
    }

    fn report_descriptor(&self) -> Option<&'static [u8]> {
        Some(REPORT_DESCRIPTOR)
    }

    fn strings(&self) -> (&'static str, &'static str) {
        ("Sony Computer Entertainment", "Wireless Controller")
    }

    fn select_configuration(
        &mut self,
        interfaces: &mut [InterfaceInformation],
    ) -> Result<(), UsbError> {
        let [hid] = interfaces else {
            return Err(UsbError::InterfaceCount(1, interfaces.len()));
        };
        hid.fill(
            0x03,
            0x00,
            0x00,
            vec![
                PipeInformation::interrupt(PIPE_IN, PACKET_SIZE, INTERVAL),
                PipeInformation::interrupt(PIPE_OUT, PACKET_SIZE, INTERVAL),
            ],
        );
        Ok(())
    }

    fn submit_report(
        &mut self,
        report: TargetReport,
        channel: &mut DeviceChannel,
    ) -> Result<(), UsbError> {
        let TargetReport::Ds4(report) = report else {
            return Err(UsbError::NotSupported);
        };
        let data = input_report(&report)?;
        log::trace!("Submitting DS4 report: {data:02X?}");
        channel.submit_report(data);
        Ok(())
    }

    fn transfer(
        &mut self,
        transfer: InterruptTransfer,
        request: PendingRequest,
        channel: &mut DeviceChannel,
    ) -> Result<Outcome, UsbError> {
        match (transfer.direction(), transfer.endpoint()) {
            (TransferDirection::In, PIPE_IN) => Ok(channel.enqueue_pending_transfer(request)),
            (TransferDirection::Out, PIPE_OUT) => {
                self.handle_output(&transfer.buffer, channel)?;
                Ok(Outcome::Immediate(Completion::success(Vec::new())))
            }
            _ => Err(UsbError::InvalidPipe(transfer.pipe)),
        }
    }

    fn control_transfer(&mut self, setup: &SetupPacket, data: &[u8]) -> Result<Vec<u8>, UsbError> {
        let (report_type, report_id) = setup.report();
        match setup.request {
            hid_request::GET_REPORT if report_type == hid_report_type::FEATURE => {
                let mut report = match report_id {
                    FEATURE_REPORT_CALIBRATION => CALIBRATION_REPORT.to_vec(),
                    FEATURE_REPORT_PAIRING_INFO => {
                        pairing_info_report(&self.device_mac, &self.host_mac)
                    }
                    FEATURE_REPORT_FIRMWARE_INFO => firmware_info_report(),
                    _ => {
                        log::debug!("Unsupported DS4 feature report: 0x{report_id:02X}");
                        return Err(UsbError::NotSupported);
                    }
                };
                report.truncate(setup.length as usize);
                Ok(report)
            }
            hid_request::SET_REPORT => {
                if report_type == hid_report_type::FEATURE
                    && report_id == FEATURE_REPORT_SET_HOST_MAC
                {
                    let Some(mac) = data.get(1..7) else {
                        return Err(UsbError::InvalidBuffer(format!(
                            "host address report too short: {} bytes",
                            data.len()
                        )));
                    };
                    // Stored on the wire little-endian
                    for (i, byte) in mac.iter().rev().enumerate() {
                        self.host_mac[i] = *byte;
                    }
                    log::debug!("DS4 {} paired to host {:02X?}", self.serial, self.host_mac);
                }
                Ok(Vec::new())
            }
            hid_request::SET_IDLE => Ok(Vec::new()),
            _ => Err(UsbError::NotSupported),
        }
    }
}

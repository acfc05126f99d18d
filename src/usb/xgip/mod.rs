//! Emulation of a wired Xbox One controller
pub mod descriptor;
pub mod report;

#[cfg(test)]
pub mod xgip_test;

use packed_struct::prelude::*;

use crate::bus::{
    channel::DeviceChannel,
    protocol::XgipRequestNotification,
    request::{Completion, Outcome, PendingRequest},
};

use self::{
    descriptor::CONFIGURATION_DESCRIPTOR,
    report::{XgipInputPacket, XGIP_INTERRUPT_SIZE, XGIP_SYS_INIT_PACKETS},
};

use super::{
    descriptor::UsbDeviceDescriptor,
    urb::{InterfaceInformation, InterruptTransfer, PipeInformation, TransferDirection},
    ChildIdentity, Family, TargetReport, UsbError, UsbTarget,
};

pub const VENDOR_ID: u16 = 0x045E;
pub const PRODUCT_ID: u16 = 0x02D1;

const PACKET_SIZE: u16 = 0x40;

const PIPE_IN: u8 = 0x81;
const PIPE_OUT: u8 = 0x01;
const AUDIO_PIPE_IN: u8 = 0x83;
const AUDIO_PIPE_OUT: u8 = 0x02;

#[derive(Debug)]
pub struct XgipTarget {
    serial: u32,
    vendor_id: u16,
    product_id: u16,
    /// Sequence number of the last input packet
    sequence: u8,
    /// Interrupt packets collected as the system init sequence
    init_packets: Vec<Vec<u8>>,
    /// Number of init packets already delivered to the host
    init_sent: usize,
}

impl XgipTarget {
    pub fn new(serial: u32, vendor_id: u16, product_id: u16) -> Self {
        Self {
            serial,
            vendor_id,
            product_id,
            sequence: 0,
            init_packets: Vec::with_capacity(XGIP_SYS_INIT_PACKETS),
            init_sent: 0,
        }
    }

    /// Returns true once the full init sequence has been collected
    pub fn is_init_ready(&self) -> bool {
        self.init_packets.len() >= XGIP_SYS_INIT_PACKETS
    }

    /// Returns the next init packet that still has to be sent to the host
    fn next_init_packet(&mut self) -> Option<Vec<u8>> {
        if !self.is_init_ready() {
            return None;
        }
        let packet = self.init_packets.get(self.init_sent)?.clone();
        self.init_sent += 1;
        Some(packet)
    }
}

impl UsbTarget for XgipTarget {
    fn family(&self) -> Family {
        Family::Xgip
    }

    fn identity(&self) -> ChildIdentity {
        ChildIdentity::new(
            self.vendor_id,
            self.product_id,
            &[
                "USB\\MS_COMP_XGIP10",
                "USB\\Class_FF&SubClass_47&Prot_D0",
                "USB\\Class_FF&SubClass_47",
                "USB\\Class_FF",
            ],
            "Virtual Xbox One Controller",
        )
    }

    fn device_descriptor(&self) -> UsbDeviceDescriptor {
        UsbDeviceDescriptor {
            device_class: 0xFF,
            device_subclass: 0x47,
            device_protocol: 0xD0,
            max_packet_size0: 0x40,
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            bcd_device: 0x0203,
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
        ("Microsoft", "Controller")
    }

    fn select_configuration(
        &mut self,
        interfaces: &mut [InterfaceInformation],
    ) -> Result<(), UsbError> {
        let [gamepad, audio] = interfaces else {
            return Err(UsbError::InterfaceCount(2, interfaces.len()));
        };
        gamepad.fill(
            0xFF,
            0x47,
            0xD0,
            vec![
                PipeInformation::interrupt(PIPE_IN, PACKET_SIZE, 0x04),
                PipeInformation::interrupt(PIPE_OUT, PACKET_SIZE, 0x04),
            ],
        );
        let pipes = if audio.alternate_setting == 1 {
            vec![
                PipeInformation::isochronous(AUDIO_PIPE_OUT, 0xE0, 0x01),
                PipeInformation::isochronous(AUDIO_PIPE_IN, 0x80, 0x01),
            ]
        } else {
            vec![]
        };
        audio.fill(0xFF, 0x47, 0xD0, pipes);
        Ok(())
    }

    fn submit_report(
        &mut self,
        report: TargetReport,
        channel: &mut DeviceChannel,
    ) -> Result<(), UsbError> {
        let TargetReport::Xgip(report) = report else {
            return Err(UsbError::NotSupported);
        };
        self.sequence = self.sequence.wrapping_add(1);
        let packet = XgipInputPacket::new(self.sequence, report).pack()?;
        log::trace!("Submitting XGIP packet: {packet:02X?}");
        channel.submit_report(packet.to_vec());
        Ok(())
    }

    fn submit_interrupt(
        &mut self,
        packet: &[u8],
        channel: &mut DeviceChannel,
    ) -> Result<(), UsbError> {
        if packet.len() > XGIP_INTERRUPT_SIZE {
            return Err(UsbError::InvalidBuffer(format!(
                "interrupt packet too large: {} bytes",
                packet.len()
            )));
        }

        if self.is_init_ready() {
            log::trace!("Submitting XGIP interrupt: {packet:02X?}");
            channel.submit_report(packet.to_vec());
            return Ok(());
        }

        self.init_packets.push(packet.to_vec());
        log::debug!(
            "Collected XGIP init packet {}/{XGIP_SYS_INIT_PACKETS}",
            self.init_packets.len()
        );
        if !self.is_init_ready() {
            return Ok(());
        }

        log::info!("XGIP init sequence of device {} is ready", self.serial);
        // Transfers that were parked while the sequence was incomplete
        while let Some(packet) = self.init_packets.get(self.init_sent) {
            if !channel.complete_pending_transfer(packet) {
                break;
            }
            self.init_sent += 1;
        }

        Ok(())
    }

    fn transfer(
        &mut self,
        transfer: InterruptTransfer,
        request: PendingRequest,
        channel: &mut DeviceChannel,
    ) -> Result<Outcome, UsbError> {
        match (transfer.direction(), transfer.endpoint()) {
            (TransferDirection::In, PIPE_IN) => {
                if let Some(packet) = self.next_init_packet() {
                    log::debug!("Sending XGIP init packet {}", self.init_sent);
                    return Ok(Outcome::Immediate(Completion::success(packet)));
                }
                Ok(channel.enqueue_pending_transfer(request))
            }
            (TransferDirection::In, AUDIO_PIPE_IN) => Ok(channel.hold(request)),
            (TransferDirection::Out, PIPE_OUT) => {
                log::trace!("Got XGIP output packet: {:02X?}", transfer.buffer);
                let notification = XgipRequestNotification::with_packet(self.serial, &transfer.buffer);
                channel.submit_notification(notification.pack()?.to_vec());
                Ok(Outcome::Immediate(Completion::success(Vec::new())))
            }
            (TransferDirection::Out, AUDIO_PIPE_OUT) => {
                Ok(Outcome::Immediate(Completion::success(Vec::new())))
            }
            _ => Err(UsbError::InvalidPipe(transfer.pipe)),
        }
    }
}

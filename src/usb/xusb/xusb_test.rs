use std::error::Error;

use packed_struct::prelude::*;
use tokio::sync::mpsc::Receiver;

use crate::{
    bus::{
        channel::DeviceChannel,
        protocol::XusbRequestNotification,
        request::{Completer, Completion, Outcome, PendingRequest, RequestId},
    },
    usb::{
        urb::{InterfaceInformation, InterruptTransfer, PipeType},
        xusb::{
            descriptor::{CAPABILITIES_PACKET, CONFIGURATION_DESCRIPTOR, INIT_PACKETS},
            report::{buttons, XusbReport},
            XusbTarget,
        },
        TargetReport, UsbError, UsbTarget,
    },
};

fn pending(id: u64) -> (PendingRequest, Receiver<Completion>) {
    let (completer, rx) = Completer::channel();
    (PendingRequest::new(RequestId(id), 64, completer), rx)
}

/// Drain the init sequence from the data pipe
fn skip_init(target: &mut XusbTarget, channel: &mut DeviceChannel) -> Result<(), Box<dyn Error>> {
    for _ in 0..INIT_PACKETS.len() {
        let (request, _rx) = pending(0);
        target.transfer(InterruptTransfer::read(0x81, 32), request, channel)?;
    }
    assert!(target.is_initialized());
    Ok(())
}

#[tokio::test]
async fn descriptors() -> Result<(), Box<dyn Error>> {
    let target = XusbTarget::new(1, 0x045E, 0x028E);
    let device = target.device_descriptor().pack()?;
    assert_eq!(
        device,
        [
            0x12, 0x01, 0x00, 0x02, 0xFF, 0xFF, 0xFF, 0x08, 0x5E, 0x04, 0x8E, 0x02, 0x14, 0x01,
            0x01, 0x02, 0x03, 0x01
        ]
    );

    let config = target.configuration_descriptor();
    assert_eq!(config.len(), 0x99);
    assert_eq!(&config[..4], &[0x09, 0x02, 0x99, 0x00]);
    assert_eq!(config, &CONFIGURATION_DESCRIPTOR[..]);

    let identity = target.identity();
    assert_eq!(identity.hardware_id, "USB\\VID_045E&PID_028E");
    assert_eq!(identity.compatible_ids[0], "USB\\MS_COMP_XUSB10");

    Ok(())
}

#[tokio::test]
async fn select_configuration_fills_four_interfaces() -> Result<(), Box<dyn Error>> {
    let mut target = XusbTarget::new(1, 0x045E, 0x028E);
    let mut interfaces: Vec<InterfaceInformation> =
        (0..4).map(|n| InterfaceInformation::new(n, 0)).collect();
    target.select_configuration(&mut interfaces)?;

    assert_eq!(interfaces[0].subclass, 0x5D);
    assert_eq!(interfaces[0].protocol, 0x01);
    assert_eq!(interfaces[0].pipes[0].endpoint_address, 0x81);
    assert_eq!(interfaces[0].pipes[0].pipe_type, PipeType::Interrupt);
    assert_eq!(interfaces[1].pipes.len(), 4);
    assert_eq!(interfaces[2].pipes.len(), 1);
    assert_eq!(interfaces[3].subclass, 0xFD);
    assert!(interfaces[3].pipes.is_empty());

    let mut too_few = vec![InterfaceInformation::new(0, 0)];
    let result = target.select_configuration(&mut too_few);
    assert!(matches!(result, Err(UsbError::InterfaceCount(4, 1))));

    Ok(())
}

#[tokio::test]
async fn init_sequence_precedes_reports() -> Result<(), Box<dyn Error>> {
    let mut target = XusbTarget::new(1, 0x045E, 0x028E);
    let mut channel = DeviceChannel::new();

    // A report submitted before the host polls stays buffered
    let report = XusbReport {
        buttons: buttons::B | buttons::DPAD_UP,
        thumb_lx: -1,
        ..Default::default()
    };
    target.submit_report(TargetReport::Xusb(report), &mut channel)?;
    assert!(channel.has_fresh_report());

    for expected in INIT_PACKETS.iter() {
        let (request, _rx) = pending(1);
        let outcome = target.transfer(InterruptTransfer::read(0x81, 32), request, &mut channel)?;
        assert_eq!(outcome, Outcome::Immediate(Completion::success(expected.to_vec())));
    }

    let (request, _rx) = pending(2);
    let outcome = target.transfer(InterruptTransfer::read(0x81, 32), request, &mut channel)?;
    let Outcome::Immediate(completion) = outcome else {
        return Err("expected buffered report".into());
    };
    assert_eq!(
        completion.data,
        vec![
            0x00, 0x14, 0x01, 0x20, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00
        ]
    );

    Ok(())
}

#[tokio::test]
async fn capabilities_are_reported_once() -> Result<(), Box<dyn Error>> {
    let mut target = XusbTarget::new(1, 0x045E, 0x028E);
    let mut channel = DeviceChannel::new();

    let (request, _rx) = pending(1);
    let outcome = target.transfer(InterruptTransfer::read(0x83, 32), request, &mut channel)?;
    assert_eq!(
        outcome,
        Outcome::Immediate(Completion::success(CAPABILITIES_PACKET.to_vec()))
    );

    let (request, _rx) = pending(2);
    let outcome = target.transfer(InterruptTransfer::read(0x83, 32), request, &mut channel)?;
    assert!(outcome.is_deferred());
    assert_eq!(channel.held_count(), 1);

    let (request, _rx) = pending(3);
    let result = target.transfer(InterruptTransfer::read(0x85, 32), request, &mut channel);
    assert!(matches!(result, Err(UsbError::InvalidPipe(_))));

    Ok(())
}

#[tokio::test]
async fn led_assigns_user_index() -> Result<(), Box<dyn Error>> {
    let mut target = XusbTarget::new(5, 0x045E, 0x028E);
    let mut channel = DeviceChannel::new();
    skip_init(&mut target, &mut channel)?;
    assert_eq!(target.user_index()?, None);

    // Blinking animation does not assign an index
    let (request, _rx) = pending(1);
    target.transfer(InterruptTransfer::write(0x01, &[0x01, 0x03, 0x0A]), request, &mut channel)?;
    assert_eq!(target.user_index()?, None);
    assert!(!channel.has_fresh_notification());

    let (request, _rx) = pending(2);
    target.transfer(InterruptTransfer::write(0x01, &[0x01, 0x03, 0x05]), request, &mut channel)?;
    assert_eq!(target.user_index()?, Some(3));
    assert!(channel.has_fresh_notification());

    let (request, _rx) = pending(3);
    let outcome = channel.request_notification(request);
    let Outcome::Immediate(completion) = outcome else {
        return Err("expected buffered notification".into());
    };
    let notification = XusbRequestNotification::unpack_from_slice(&completion.data)?;
    assert_eq!(notification.serial_no, 5);
    assert_eq!(notification.led_number, 3);

    Ok(())
}

#[tokio::test]
async fn unchanged_rumble_is_not_notified() -> Result<(), Box<dyn Error>> {
    let mut target = XusbTarget::new(5, 0x045E, 0x028E);
    let mut channel = DeviceChannel::new();
    let rumble = [0x00, 0x08, 0x00, 0x10, 0x20, 0x00, 0x00, 0x00];

    let (request, _rx) = pending(1);
    target.transfer(InterruptTransfer::write(0x01, &rumble), request, &mut channel)?;
    assert!(channel.has_fresh_notification());

    let (request, _rx) = pending(2);
    channel.request_notification(request);
    assert!(!channel.has_fresh_notification());

    // Same motor values again
    let (request, _rx) = pending(3);
    target.transfer(InterruptTransfer::write(0x01, &rumble), request, &mut channel)?;
    assert!(!channel.has_fresh_notification());

    Ok(())
}

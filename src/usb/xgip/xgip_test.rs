use std::error::Error;

use packed_struct::prelude::*;
use tokio::sync::mpsc::Receiver;

use crate::{
    bus::{
        channel::DeviceChannel,
        protocol::XgipRequestNotification,
        request::{Completer, Completion, Outcome, PendingRequest, RequestId},
        status::Status,
    },
    usb::{
        urb::{InterfaceInformation, InterruptTransfer, PipeType},
        xgip::{
            report::{XgipReport, GIP_CMD_INPUT, XGIP_SYS_INIT_PACKETS},
            XgipTarget,
        },
        TargetReport, UsbError, UsbTarget,
    },
};

fn pending(id: u64) -> (PendingRequest, Receiver<Completion>) {
    let (completer, rx) = Completer::channel();
    (PendingRequest::new(RequestId(id), 64, completer), rx)
}

fn init_packet(index: usize) -> Vec<u8> {
    vec![0x04, 0x20, index as u8, 0x01, 0x00]
}

#[tokio::test]
async fn select_configuration() -> Result<(), Box<dyn Error>> {
    let mut target = XgipTarget::new(1, 0x045E, 0x02D1);

    let mut interfaces = vec![InterfaceInformation::new(0, 0), InterfaceInformation::new(1, 0)];
    target.select_configuration(&mut interfaces)?;
    let endpoints: Vec<u8> = interfaces[0]
        .pipes
        .iter()
        .map(|p| p.endpoint_address)
        .collect();
    assert_eq!(endpoints, vec![0x81, 0x01]);
    assert_eq!(interfaces[0].subclass, 0x47);
    assert!(interfaces[1].pipes.is_empty());

    // The audio alternate setting exposes isochronous pipes
    let mut interfaces = vec![InterfaceInformation::new(0, 0), InterfaceInformation::new(1, 1)];
    target.select_configuration(&mut interfaces)?;
    assert_eq!(interfaces[1].pipes.len(), 2);
    assert!(interfaces[1]
        .pipes
        .iter()
        .all(|p| p.pipe_type == PipeType::Isochronous));

    let mut interfaces = vec![InterfaceInformation::new(0, 0)];
    let result = target.select_configuration(&mut interfaces);
    assert!(matches!(result, Err(UsbError::InterfaceCount(2, 1))));

    Ok(())
}

#[tokio::test]
async fn report_packet_sequence() -> Result<(), Box<dyn Error>> {
    let mut target = XgipTarget::new(1, 0x045E, 0x02D1);
    let mut channel = DeviceChannel::new();

    let report = XgipReport {
        buttons1: 0x10,
        left_trigger: 0x03FF,
        thumb_lx: -1,
        ..Default::default()
    };
    target.submit_report(TargetReport::Xgip(report), &mut channel)?;
    target.submit_report(TargetReport::Xgip(report), &mut channel)?;

    // Only the most recent report stays buffered
    let (request, _rx) = pending(1);
    let outcome = target.transfer(InterruptTransfer::read(0x81, 64), request, &mut channel)?;
    let Outcome::Immediate(completion) = outcome else {
        return Err("expected buffered report".into());
    };
    assert_eq!(completion.data.len(), 18);
    assert_eq!(&completion.data[..4], &[GIP_CMD_INPUT, 0x00, 0x02, 0x0E]);
    assert_eq!(
        &completion.data[4..12],
        &[0x10, 0x00, 0xFF, 0x03, 0x00, 0x00, 0xFF, 0xFF]
    );

    Ok(())
}

#[tokio::test]
async fn init_sequence_served_in_order() -> Result<(), Box<dyn Error>> {
    let mut target = XgipTarget::new(1, 0x045E, 0x02D1);
    let mut channel = DeviceChannel::new();

    // A transfer issued before the sequence is complete waits
    let (request, mut parked) = pending(1);
    let outcome = target.transfer(InterruptTransfer::read(0x81, 64), request, &mut channel)?;
    assert!(outcome.is_deferred());

    for index in 0..XGIP_SYS_INIT_PACKETS {
        assert!(!target.is_init_ready());
        target.submit_interrupt(&init_packet(index), &mut channel)?;
    }
    assert!(target.is_init_ready());

    let completion = parked.recv().await.ok_or("parked transfer was not completed")?;
    assert_eq!(completion.data, init_packet(0));

    for index in 1..XGIP_SYS_INIT_PACKETS {
        let (request, _rx) = pending(index as u64 + 1);
        let outcome = target.transfer(InterruptTransfer::read(0x81, 64), request, &mut channel)?;
        assert_eq!(outcome, Outcome::Immediate(Completion::success(init_packet(index))));
    }

    // After the sequence interrupts are forwarded as they are
    let (request, _rx) = pending(100);
    let outcome = target.transfer(InterruptTransfer::read(0x81, 64), request, &mut channel)?;
    assert!(outcome.is_deferred());
    target.submit_interrupt(&[0x07, 0x20, 0x01], &mut channel)?;
    assert_eq!(channel.pending_transfer_count(), 0);

    let result = target.submit_interrupt(&[0u8; 65], &mut channel);
    assert!(matches!(result, Err(UsbError::InvalidBuffer(_))));

    Ok(())
}

#[tokio::test]
async fn output_packets_notify() -> Result<(), Box<dyn Error>> {
    let mut target = XgipTarget::new(4, 0x045E, 0x02D1);
    let mut channel = DeviceChannel::new();

    let rumble = [0x09, 0x00, 0x01, 0x09, 0x00, 0x0F, 0x00, 0x00, 0x40, 0x40, 0xFF, 0x00, 0xEB];
    let (request, _rx) = pending(1);
    let outcome = target.transfer(InterruptTransfer::write(0x01, &rumble), request, &mut channel)?;
    assert_eq!(outcome.status(), Status::Success);

    let (request, _rx) = pending(2);
    let Outcome::Immediate(completion) = channel.request_notification(request) else {
        return Err("expected buffered notification".into());
    };
    let data: [u8; 76] = completion.data.as_slice().try_into()?;
    let notification = XgipRequestNotification::unpack(&data)?;
    assert_eq!(notification.serial_no, 4);
    assert_eq!(notification.notification_length as usize, rumble.len());
    assert_eq!(&notification.notification[..rumble.len()], &rumble);

    // Audio pipes are accepted but never produce data
    let (request, _rx) = pending(3);
    let outcome = target.transfer(InterruptTransfer::read(0x83, 64), request, &mut channel)?;
    assert!(outcome.is_deferred());
    assert_eq!(channel.held_count(), 1);
    let (request, _rx) = pending(4);
    let outcome = target.transfer(InterruptTransfer::write(0x02, &[0; 8]), request, &mut channel)?;
    assert_eq!(outcome.status(), Status::Success);

    let (request, _rx) = pending(5);
    let result = target.transfer(InterruptTransfer::read(0x84, 64), request, &mut channel);
    assert!(matches!(result, Err(UsbError::InvalidPipe(_))));

    Ok(())
}

use std::error::Error;

use packed_struct::prelude::*;

use crate::{
    bus::{
        ioctl::IoControlCode,
        manager::BusManager,
        protocol::{WireRequest, XusbRequestNotification},
        status::Status,
        CallerId, Origin,
    },
    config::BusConfig,
    usb::{descriptor::DEVICE_DESCRIPTOR_TYPE, urb::InterruptTransfer, Family},
};

fn app(name: &str) -> Origin {
    Origin::Application(CallerId::from(name))
}

#[tokio::test]
async fn concurrent_plug_in_of_same_serial() -> Result<(), Box<dyn Error>> {
    let mut manager = BusManager::new(&BusConfig::default(), None);
    let client = manager.client();
    let task = tokio::spawn(async move { manager.run().await.is_ok() });

    let first = client.clone();
    let second = client.clone();
    let (a, b) = tokio::join!(
        first.plug_in(11, Family::Xusb, app(":1.1")),
        second.plug_in(11, Family::Ds4, app(":1.2")),
    );
    let mut statuses = vec![a?, b?];
    statuses.sort_by_key(|status| status.to_u32());
    assert_eq!(statuses, vec![Status::Success, Status::ObjectNameCollision]);

    let children = client.get_children().await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].serial, 11);

    client.stop().await?;
    assert!(task.await?);

    Ok(())
}

#[tokio::test]
async fn feedback_reaches_waiting_application() -> Result<(), Box<dyn Error>> {
    let mut manager = BusManager::new(&BusConfig::default(), None);
    let client = manager.client();
    let task = tokio::spawn(async move { manager.run().await.is_ok() });

    let owner = app(":1.5");
    assert_eq!(client.check_version(owner.clone()).await?, Status::Success);
    assert_eq!(client.plug_in(3, Family::Xusb, owner.clone()).await?, Status::Success);

    let descriptor = client
        .get_descriptor(3, DEVICE_DESCRIPTOR_TYPE, 0, 18)
        .await??;
    assert_eq!(&descriptor[8..12], &[0x5E, 0x04, 0x8E, 0x02]);

    // Wait for feedback without blocking the bus
    let input = XusbRequestNotification::new(3).pack()?;
    let (_, mut notification) = client
        .start_device_control(
            IoControlCode::XusbRequestNotification.code(),
            input.to_vec(),
            XusbRequestNotification::SIZE,
            owner.clone(),
        )
        .await?;

    let transfer = InterruptTransfer::write(0x01, &[0x00, 0x08, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00]);
    let completion = client.transfer(3, transfer).await?;
    assert_eq!(completion.status, Status::Success);

    let completion = notification.recv().await.ok_or("no completion")?;
    assert_eq!(completion.status, Status::Success);
    let feedback = XusbRequestNotification::unpack_from_slice(&completion.data)?;
    assert_eq!(feedback.large_motor, 0x80);

    // Parked transfers are completed when the bus stops
    let (id, _) = client.submit_transfer(3, InterruptTransfer::read(0x82, 32)).await?;
    let (_, mut parked) = client.submit_transfer(3, InterruptTransfer::read(0x84, 32)).await?;
    client.cancel(id, Origin::Internal).await?;
    client.stop().await?;
    let completion = parked.recv().await.ok_or("no completion")?;
    assert_eq!(completion.status, Status::DeviceRemoved);
    assert!(task.await?);

    Ok(())
}

#[tokio::test]
async fn departed_caller_loses_its_devices() -> Result<(), Box<dyn Error>> {
    let mut manager = BusManager::new(&BusConfig::default(), None);
    let client = manager.client();
    let task = tokio::spawn(async move { manager.run().await.is_ok() });

    client.plug_in(1, Family::Ds4, app(":1.8")).await?;
    client.plug_in(2, Family::Xgip, app(":1.9")).await?;
    client.release_owner(CallerId::from(":1.8")).await?;

    let children = client.get_children().await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].serial, 2);

    // Another caller cannot remove the remaining device
    let status = client.unplug(2, app(":1.8")).await?;
    assert_eq!(status, Status::AccessDenied);
    let status = client.unplug(2, app(":1.9")).await?;
    assert_eq!(status, Status::Success);

    client.stop().await?;
    assert!(task.await?);

    Ok(())
}

#[tokio::test]
async fn owner_withdraws_parked_notification() -> Result<(), Box<dyn Error>> {
    let mut manager = BusManager::new(&BusConfig::default(), None);
    let client = manager.client();
    let task = tokio::spawn(async move { manager.run().await.is_ok() });

    let owner = app(":1.3");
    assert_eq!(client.plug_in(2, Family::Xusb, owner.clone()).await?, Status::Success);

    let input = XusbRequestNotification::new(2).pack()?;
    let (id, mut notification) = client
        .start_device_control(
            IoControlCode::XusbRequestNotification.code(),
            input.to_vec(),
            XusbRequestNotification::SIZE,
            owner.clone(),
        )
        .await?;

    // Another caller cannot withdraw it
    client.cancel(id, app(":1.4")).await?;
    assert_eq!(
        client.cancel_requests(2, app(":1.4")).await?,
        Err(Status::AccessDenied)
    );

    assert_eq!(client.cancel_requests(2, owner).await?, Ok(1));
    let completion = notification.recv().await.ok_or("no completion")?;
    assert_eq!(completion.status, Status::Cancelled);

    client.stop().await?;
    assert!(task.await?);

    Ok(())
}

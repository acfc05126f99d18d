use std::error::Error;

use tokio::sync::mpsc::Receiver;

use crate::{
    bus::{
        device::DeviceState,
        registry::{ChildRegistry, RegistryError},
        request::{Completer, Completion, PendingRequest, RequestId},
        status::Status,
        CallerId, Origin,
    },
    usb::{urb::InterruptTransfer, Family},
};

fn app(name: &str) -> Origin {
    Origin::Application(CallerId::from(name))
}

fn pending(id: u64) -> (PendingRequest, Receiver<Completion>) {
    let (completer, rx) = Completer::channel();
    (PendingRequest::new(RequestId(id), 64, completer), rx)
}

#[tokio::test]
async fn plug_in_and_lookup() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(None);
    let device = registry.plug_in(1, Family::Xusb, 0, 0, &app(":1.10"))?;
    assert_eq!(device.serial(), 1);
    assert_eq!(device.family(), Family::Xusb);
    assert_eq!(device.state(), DeviceState::Created);
    assert_eq!(device.owner(), Some(&CallerId::from(":1.10")));
    assert_eq!(device.identity().hardware_id, "USB\\VID_045E&PID_028E");

    assert!(registry.contains(1));
    assert!(registry.lookup(1).is_ok());
    assert_eq!(
        registry.lookup(2).err(),
        Some(RegistryError::NotFound(2))
    );

    Ok(())
}

#[tokio::test]
async fn duplicate_and_zero_serials_are_rejected() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(None);
    registry.plug_in(5, Family::Ds4, 0, 0, &app(":1.10"))?;

    let result = registry.plug_in(5, Family::Xgip, 0, 0, &app(":1.11"));
    assert_eq!(result.err(), Some(RegistryError::Duplicate(5)));

    let result = registry.plug_in(0, Family::Xgip, 0, 0, &app(":1.11"));
    assert_eq!(result.err(), Some(RegistryError::InvalidSerial));
    assert_eq!(registry.len(), 1);
    assert_eq!(Status::from(RegistryError::Duplicate(5)), Status::ObjectNameCollision);

    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_unplug() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(None);
    registry.plug_in(3, Family::Xusb, 0, 0, &app(":1.10"))?;

    let result = registry.unplug(3, &app(":1.99"));
    assert_eq!(result, Err(RegistryError::AccessDenied(3)));
    assert!(registry.contains(3));

    // In-process components bypass ownership
    assert_eq!(registry.unplug(3, &Origin::Internal), Ok(0));
    assert!(registry.is_empty());

    // The serial can be reused once the device is gone
    registry.plug_in(3, Family::Ds4, 0, 0, &app(":1.99"))?;

    Ok(())
}

#[tokio::test]
async fn unplug_drains_parked_transfers() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(None);
    let owner = app(":1.10");
    registry.plug_in(2, Family::Ds4, 0, 0, &owner)?;

    let (request, mut rx) = pending(1);
    let device = registry.lookup(2)?;
    let outcome = device.transfer(InterruptTransfer::read(0x84, 64), request)?;
    assert!(outcome.is_deferred());

    assert_eq!(registry.unplug(2, &owner), Ok(1));
    assert_eq!(rx.try_recv()?.status, Status::DeviceRemoved);

    Ok(())
}

#[tokio::test]
async fn release_owner_removes_only_owned_devices() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(None);
    registry.plug_in(1, Family::Xusb, 0, 0, &app(":1.10"))?;
    registry.plug_in(2, Family::Ds4, 0, 0, &app(":1.11"))?;
    registry.plug_in(3, Family::Xgip, 0, 0, &app(":1.10"))?;
    registry.plug_in(4, Family::Xusb, 0, 0, &Origin::Internal)?;

    let removed = registry.release_owner(&CallerId::from(":1.10"));
    assert_eq!(removed, vec![(1, 0), (3, 0)]);
    assert_eq!(registry.serials(), vec![2, 4]);

    let removed = registry.clear();
    assert_eq!(removed.len(), 2);
    assert!(registry.is_empty());

    Ok(())
}

#[tokio::test]
async fn child_limit_is_enforced() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(Some(2));
    registry.plug_in(1, Family::Xusb, 0, 0, &Origin::Internal)?;
    registry.plug_in(2, Family::Xusb, 0, 0, &Origin::Internal)?;
    let result = registry.plug_in(3, Family::Xusb, 0, 0, &Origin::Internal);
    assert_eq!(result.err(), Some(RegistryError::LimitReached(2)));
    assert_eq!(
        Status::from(RegistryError::LimitReached(2)),
        Status::InsufficientResources
    );

    Ok(())
}

#[tokio::test]
async fn explicit_ids_override_defaults() -> Result<(), Box<dyn Error>> {
    let mut registry = ChildRegistry::new(None);
    registry.set_default_ids(Family::Xusb, 0x1234, 0x5678);

    let device = registry.plug_in(1, Family::Xusb, 0, 0, &Origin::Internal)?;
    assert_eq!(device.identity().vendor_id, 0x1234);
    assert_eq!(device.identity().product_id, 0x5678);

    let device = registry.plug_in(2, Family::Xusb, 0x0F0D, 0x00C1, &Origin::Internal)?;
    assert_eq!(device.identity().hardware_id, "USB\\VID_0F0D&PID_00C1");

    Ok(())
}

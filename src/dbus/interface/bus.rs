use std::str::FromStr;

use zbus::{fdo, message::Header};
use zbus_macros::interface;

use crate::{
    bus::{client::BusClient, status::Status, CallerId, Origin},
    constants::COMMON_VERSION,
    dbus::interface::Unregisterable,
    usb::Family,
};

/// Largest output buffer a caller may ask for
const MAX_OUTPUT_LENGTH: u32 = 0x1000;

/// The [BusInterface] is the control surface of the bus. Every method is
/// executed on behalf of the unique name of the caller, which becomes the
/// owner of the devices it plugs in.
pub struct BusInterface {
    client: BusClient,
}

impl BusInterface {
    pub fn new(client: BusClient) -> Self {
        Self { client }
    }
}

/// Returns the origin of the given method call
pub(super) fn caller_origin(hdr: &Header<'_>) -> fdo::Result<Origin> {
    let sender = hdr
        .sender()
        .ok_or_else(|| fdo::Error::Failed("Missing sender".into()))?;
    Ok(Origin::Application(CallerId(sender.to_string())))
}

#[interface(
    name = "org.shadowblip.PadBus.Bus",
    proxy(
        default_service = "org.shadowblip.PadBus",
        default_path = "/org/shadowblip/PadBus/Bus"
    )
)]
impl BusInterface {
    /// Version of the binary control protocol
    #[zbus(property)]
    async fn version(&self) -> fdo::Result<u32> {
        Ok(COMMON_VERSION)
    }

    /// Issue a binary control request. Returns the completion status and
    /// output data. Notification requests only return once the device
    /// produces feedback or is removed.
    async fn device_control(
        &self,
        code: u32,
        input: Vec<u8>,
        output_length: u32,
        #[zbus(header)] hdr: Header<'_>,
    ) -> fdo::Result<(u32, Vec<u8>)> {
        let origin = caller_origin(&hdr)?;
        let output_length = output_length.min(MAX_OUTPUT_LENGTH) as usize;
        let completion = self
            .client
            .device_control(code, input, output_length, origin)
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        Ok((completion.status.to_u32(), completion.data))
    }

    /// Plug in a device of the given family (e.g. "xusb", "ds4", "xgip")
    async fn plug_in(
        &self,
        kind: String,
        serial: u32,
        #[zbus(header)] hdr: Header<'_>,
    ) -> fdo::Result<u32> {
        let origin = caller_origin(&hdr)?;
        let family = Family::from_str(kind.as_str()).map_err(fdo::Error::InvalidArgs)?;
        let status = self
            .client
            .plug_in(serial, family, origin)
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        Ok(status.to_u32())
    }

    /// Unplug the device with the given serial
    async fn unplug(&self, serial: u32, #[zbus(header)] hdr: Header<'_>) -> fdo::Result<u32> {
        let origin = caller_origin(&hdr)?;
        let status = self
            .client
            .unplug(serial, origin)
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        Ok(status.to_u32())
    }

    /// Cancel every notification request the caller has parked on the
    /// given device. The parked calls return with a cancelled status.
    /// Returns the status and the number of cancelled requests.
    async fn cancel_requests(
        &self,
        serial: u32,
        #[zbus(header)] hdr: Header<'_>,
    ) -> fdo::Result<(u32, u32)> {
        let origin = caller_origin(&hdr)?;
        let result = self
            .client
            .cancel_requests(serial, origin)
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        match result {
            Ok(count) => Ok((Status::Success.to_u32(), count as u32)),
            Err(status) => Ok((status.to_u32(), 0)),
        }
    }

    /// List every live device as (serial, family, owner, state)
    async fn devices(&self) -> fdo::Result<Vec<(u32, String, String, String)>> {
        let children = self
            .client
            .get_children()
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))?;
        let devices = children
            .into_iter()
            .map(|child| {
                let owner = child.owner.map(|o| o.0).unwrap_or_default();
                (
                    child.serial,
                    child.family.to_string(),
                    owner,
                    child.state.to_string(),
                )
            })
            .collect();
        Ok(devices)
    }
}

impl Unregisterable for BusInterface {}

use std::error::Error;

use packed_struct::prelude::*;

use crate::{
    bus::{
        protocol::{
            decode_request, decode_targeted, CheckVersion, PluginTarget, UnplugTarget,
            WireRequest, XgipSubmitInterrupt, XusbRequestNotification, XusbSubmitReport,
        },
        status::Status,
    },
    constants::COMMON_VERSION,
    usb::xusb::report::XusbReport,
};

#[tokio::test]
async fn plugin_target_layout() -> Result<(), Box<dyn Error>> {
    let mut request = PluginTarget::new(7, 2);
    request.vendor_id = 0x054C;
    request.product_id = 0x05C4;
    let data = request.pack()?;
    assert_eq!(
        data,
        [16, 0, 0, 0, 7, 0, 0, 0, 2, 0, 0, 0, 0x4C, 0x05, 0xC4, 0x05]
    );

    let decoded: PluginTarget = decode_request(&data, data.len())?;
    assert_eq!(decoded, request);

    Ok(())
}

#[tokio::test]
async fn check_version_defaults_to_common_version() -> Result<(), Box<dyn Error>> {
    let data = CheckVersion::default().pack()?;
    let decoded: CheckVersion = decode_request(&data, 8)?;
    assert_eq!(decoded.version, COMMON_VERSION);
    assert_eq!(decoded.size as usize, CheckVersion::SIZE);

    Ok(())
}

#[tokio::test]
async fn wrong_buffer_length_is_rejected() -> Result<(), Box<dyn Error>> {
    let data = UnplugTarget::new(1).pack()?;

    let result = decode_request::<UnplugTarget>(&data[..4], 4);
    assert_eq!(result, Err(Status::InvalidParameter));

    let mut long = data.to_vec();
    long.push(0);
    let result = decode_request::<UnplugTarget>(&long, long.len());
    assert_eq!(result, Err(Status::InvalidParameter));

    Ok(())
}

#[tokio::test]
async fn size_field_must_match() -> Result<(), Box<dyn Error>> {
    let mut request = XusbSubmitReport::new(1, XusbReport::default());
    request.size = 24;
    let data = request.pack()?;
    let result = decode_request::<XusbSubmitReport>(&data, data.len());
    assert_eq!(result, Err(Status::InvalidParameter));

    Ok(())
}

#[tokio::test]
async fn declared_length_must_match() -> Result<(), Box<dyn Error>> {
    let data = XusbRequestNotification::new(1).pack()?;
    let result = decode_request::<XusbRequestNotification>(&data, data.len() + 1);
    assert_eq!(result, Err(Status::InvalidParameter));

    Ok(())
}

#[tokio::test]
async fn serial_zero_is_rejected() -> Result<(), Box<dyn Error>> {
    let data = UnplugTarget::new(0).pack()?;
    let result = decode_targeted::<UnplugTarget>(&data, data.len());
    assert_eq!(result, Err(Status::InvalidParameter));

    let data = UnplugTarget::new(9).pack()?;
    let request = decode_targeted::<UnplugTarget>(&data, data.len())?;
    assert_eq!(request.serial_no, 9);

    Ok(())
}

#[tokio::test]
async fn interrupt_packet_length() -> Result<(), Box<dyn Error>> {
    let request = XgipSubmitInterrupt::new(3, &[0x05, 0x20, 0x00, 0x01, 0x00]);
    assert_eq!(request.packet(), Some(&[0x05, 0x20, 0x00, 0x01, 0x00][..]));

    let mut invalid = request;
    invalid.interrupt_length = 65;
    assert_eq!(invalid.packet(), None);

    Ok(())
}

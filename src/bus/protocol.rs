//! Fixed-layout request records exchanged over the control surface. Every
//! record starts with a little-endian `Size` field that must equal the
//! record's fixed size.
use packed_struct::prelude::*;

use crate::{
    bus::status::Status,
    constants::COMMON_VERSION,
    usb::{
        ds4::report::Ds4Report,
        xgip::report::{XgipReport, XGIP_INTERRUPT_SIZE},
        xusb::report::XusbReport,
    },
};

/// A fixed-size record of the control protocol
pub trait WireRequest: PackedStructSlice + Sized {
    /// Fixed size of the record in bytes
    const SIZE: usize;

    /// Value of the self-declared `Size` field
    fn size_field(&self) -> u32;
}

/// A record that targets one specific child device
pub trait TargetedRequest: WireRequest {
    fn serial_no(&self) -> u32;
}

/// Decode the given input buffer into the expected record. The buffer must
/// be exactly [WireRequest::SIZE] bytes long, match the length the caller
/// declared, and carry a matching `Size` field.
pub fn decode_request<T: WireRequest>(input: &[u8], declared_length: usize) -> Result<T, Status> {
    if input.len() < T::SIZE {
        log::warn!(
            "Input buffer too small: expected {} bytes, got {}",
            T::SIZE,
            input.len()
        );
        return Err(Status::InvalidParameter);
    }
    if input.len() != T::SIZE {
        log::warn!(
            "Input buffer size mismatch: expected {} bytes, got {}",
            T::SIZE,
            input.len()
        );
        return Err(Status::InvalidParameter);
    }

    let request = T::unpack_from_slice(input).map_err(|e| {
        log::warn!("Unable to unpack request: {e:?}");
        Status::InvalidParameter
    })?;

    if request.size_field() as usize != T::SIZE || input.len() != declared_length {
        log::warn!(
            "Request size mismatch: declared Size {}, buffer {}, input length {}, expected {}",
            request.size_field(),
            input.len(),
            declared_length,
            T::SIZE
        );
        return Err(Status::InvalidParameter);
    }

    Ok(request)
}

/// Decode a record that targets a child device. Serial number zero is
/// reserved and always rejected.
pub fn decode_targeted<T: TargetedRequest>(
    input: &[u8],
    declared_length: usize,
) -> Result<T, Status> {
    let request: T = decode_request(input, declared_length)?;
    if request.serial_no() == 0 {
        log::warn!("Invalid serial 0 submitted");
        return Err(Status::InvalidParameter);
    }
    Ok(request)
}

/// Protocol version handshake
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct CheckVersion {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub version: u32,
}

impl CheckVersion {
    pub fn new(version: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            version,
        }
    }
}

impl Default for CheckVersion {
    fn default() -> Self {
        Self::new(COMMON_VERSION)
    }
}

impl WireRequest for CheckVersion {
    const SIZE: usize = 8;

    fn size_field(&self) -> u32 {
        self.size
    }
}

/// Request to create a new child device
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "16")]
pub struct PluginTarget {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    /// One of the [crate::usb::Family] target type values
    #[packed_field(bytes = "8..=11", endian = "lsb")]
    pub target_type: u32,
    #[packed_field(bytes = "12..=13", endian = "lsb")]
    pub vendor_id: u16,
    #[packed_field(bytes = "14..=15", endian = "lsb")]
    pub product_id: u16,
}

impl PluginTarget {
    pub fn new(serial_no: u32, target_type: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            target_type,
            vendor_id: 0,
            product_id: 0,
        }
    }
}

impl WireRequest for PluginTarget {
    const SIZE: usize = 16;

    fn size_field(&self) -> u32 {
        self.size
    }
}

/// Request to remove a child device
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct UnplugTarget {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
}

impl UnplugTarget {
    pub fn new(serial_no: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
        }
    }
}

impl WireRequest for UnplugTarget {
    const SIZE: usize = 8;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for UnplugTarget {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// Xbox 360 input report submission
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "20")]
pub struct XusbSubmitReport {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8..=19")]
    pub report: XusbReport,
}

impl XusbSubmitReport {
    pub fn new(serial_no: u32, report: XusbReport) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            report,
        }
    }
}

impl WireRequest for XusbSubmitReport {
    const SIZE: usize = 20;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for XusbSubmitReport {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// Xbox 360 rumble and LED notification. Used both as the request and as
/// the completed response.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "12")]
pub struct XusbRequestNotification {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8")]
    pub large_motor: u8,
    #[packed_field(bytes = "9")]
    pub small_motor: u8,
    #[packed_field(bytes = "10")]
    pub led_number: u8,
}

impl XusbRequestNotification {
    pub fn new(serial_no: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            large_motor: 0,
            small_motor: 0,
            led_number: 0,
        }
    }
}

impl WireRequest for XusbRequestNotification {
    const SIZE: usize = 12;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for XusbRequestNotification {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// Query for the XInput user index assigned to an Xbox 360 child
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "12")]
pub struct XusbGetUserIndex {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8..=11", endian = "lsb")]
    pub user_index: u32,
}

impl XusbGetUserIndex {
    pub fn new(serial_no: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            user_index: 0,
        }
    }
}

impl WireRequest for XusbGetUserIndex {
    const SIZE: usize = 12;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for XusbGetUserIndex {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// DualShock 4 input report submission
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "20")]
pub struct Ds4SubmitReport {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8..=16")]
    pub report: Ds4Report,
}

impl Ds4SubmitReport {
    pub fn new(serial_no: u32, report: Ds4Report) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            report,
        }
    }
}

impl WireRequest for Ds4SubmitReport {
    const SIZE: usize = 20;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for Ds4SubmitReport {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// DualShock 4 rumble and lightbar notification
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "16")]
pub struct Ds4RequestNotification {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8")]
    pub large_motor: u8,
    #[packed_field(bytes = "9")]
    pub small_motor: u8,
    #[packed_field(bytes = "10")]
    pub red: u8,
    #[packed_field(bytes = "11")]
    pub green: u8,
    #[packed_field(bytes = "12")]
    pub blue: u8,
}

impl Ds4RequestNotification {
    pub fn new(serial_no: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            large_motor: 0,
            small_motor: 0,
            red: 0,
            green: 0,
            blue: 0,
        }
    }
}

impl WireRequest for Ds4RequestNotification {
    const SIZE: usize = 16;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for Ds4RequestNotification {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// Xbox One input report submission
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "24")]
pub struct XgipSubmitReport {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8..=21")]
    pub report: XgipReport,
}

impl XgipSubmitReport {
    pub fn new(serial_no: u32, report: XgipReport) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            report,
        }
    }
}

impl WireRequest for XgipSubmitReport {
    const SIZE: usize = 24;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for XgipSubmitReport {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// Raw Xbox One interrupt packet submission. The first packets submitted
/// for a child form its system init sequence.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "76")]
pub struct XgipSubmitInterrupt {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8..=71")]
    pub interrupt: [u8; 64],
    #[packed_field(bytes = "72..=75", endian = "lsb")]
    pub interrupt_length: u32,
}

impl XgipSubmitInterrupt {
    /// Create a new interrupt submission with the given packet. Packets
    /// longer than 64 bytes are truncated.
    pub fn new(serial_no: u32, packet: &[u8]) -> Self {
        let length = packet.len().min(XGIP_INTERRUPT_SIZE);
        let mut interrupt = [0; XGIP_INTERRUPT_SIZE];
        interrupt[..length].copy_from_slice(&packet[..length]);
        Self {
            size: Self::SIZE as u32,
            serial_no,
            interrupt,
            interrupt_length: length as u32,
        }
    }

    /// Returns the valid part of the interrupt packet, or None if the
    /// declared length is out of range.
    pub fn packet(&self) -> Option<&[u8]> {
        let length = self.interrupt_length as usize;
        if length > XGIP_INTERRUPT_SIZE {
            return None;
        }
        Some(&self.interrupt[..length])
    }
}

impl WireRequest for XgipSubmitInterrupt {
    const SIZE: usize = 76;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for XgipSubmitInterrupt {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

/// Xbox One feedback notification carrying the raw OUT packet written by
/// the host.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "76")]
pub struct XgipRequestNotification {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub size: u32,
    #[packed_field(bytes = "4..=7", endian = "lsb")]
    pub serial_no: u32,
    #[packed_field(bytes = "8..=71")]
    pub notification: [u8; 64],
    #[packed_field(bytes = "72..=75", endian = "lsb")]
    pub notification_length: u32,
}

impl XgipRequestNotification {
    pub fn new(serial_no: u32) -> Self {
        Self {
            size: Self::SIZE as u32,
            serial_no,
            notification: [0; XGIP_INTERRUPT_SIZE],
            notification_length: 0,
        }
    }

    /// Create a notification response carrying the given OUT packet
    pub fn with_packet(serial_no: u32, packet: &[u8]) -> Self {
        let mut notification = Self::new(serial_no);
        let length = packet.len().min(XGIP_INTERRUPT_SIZE);
        notification.notification[..length].copy_from_slice(&packet[..length]);
        notification.notification_length = length as u32;
        notification
    }
}

impl WireRequest for XgipRequestNotification {
    const SIZE: usize = 76;

    fn size_field(&self) -> u32 {
        self.size
    }
}

impl TargetedRequest for XgipRequestNotification {
    fn serial_no(&self) -> u32 {
        self.serial_no
    }
}

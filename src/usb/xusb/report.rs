//! Xbox 360 (XUSB) report layouts
use packed_struct::prelude::*;

/// Size of the interrupt IN packet sent to the host
pub const XUSB_PACKET_SIZE: usize = 0x14;
/// Size of an OUT packet that sets the LED ring
pub const XUSB_LEDSET_SIZE: usize = 3;
/// Size of an OUT packet that sets rumble motors
pub const XUSB_RUMBLE_SIZE: usize = 8;

/// Button bits of [XusbReport::buttons]
pub mod buttons {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const GUIDE: u16 = 0x0400;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;
}

/// Gamepad state submitted by an application, identical to the XInput
/// gamepad layout.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "12")]
pub struct XusbReport {
    #[packed_field(bytes = "0..=1", endian = "lsb")]
    pub buttons: u16,
    #[packed_field(bytes = "2")]
    pub left_trigger: u8,
    #[packed_field(bytes = "3")]
    pub right_trigger: u8,
    #[packed_field(bytes = "4..=5", endian = "lsb")]
    pub thumb_lx: i16,
    #[packed_field(bytes = "6..=7", endian = "lsb")]
    pub thumb_ly: i16,
    #[packed_field(bytes = "8..=9", endian = "lsb")]
    pub thumb_rx: i16,
    #[packed_field(bytes = "10..=11", endian = "lsb")]
    pub thumb_ry: i16,
}

/// Interrupt IN packet delivered on endpoint 0x81
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "20")]
pub struct XusbInterruptInPacket {
    #[packed_field(bytes = "0")]
    pub id: u8,
    #[packed_field(bytes = "1")]
    pub size: u8,
    #[packed_field(bytes = "2..=13")]
    pub report: XusbReport,
}

impl XusbInterruptInPacket {
    pub fn new(report: XusbReport) -> Self {
        Self {
            id: 0x00,
            size: XUSB_PACKET_SIZE as u8,
            report,
        }
    }
}

impl Default for XusbInterruptInPacket {
    fn default() -> Self {
        Self::new(XusbReport::default())
    }
}

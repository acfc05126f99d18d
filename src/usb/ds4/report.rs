//! Structures derived from the work of the community of the Game Controller
//! Collective Wiki.
//! Source: https://controllers.fandom.com/wiki/Sony_DualShock_4
use packed_struct::prelude::*;

pub const INPUT_REPORT_USB: u8 = 0x01;
pub const INPUT_REPORT_USB_SIZE: usize = 64;
pub const OUTPUT_REPORT_USB: u8 = 0x05;
pub const OUTPUT_REPORT_USB_SIZE: usize = 32;

pub const FEATURE_REPORT_CALIBRATION: u8 = 0x02;
pub const FEATURE_REPORT_PAIRING_INFO: u8 = 0x12;
pub const FEATURE_REPORT_SET_HOST_MAC: u8 = 0x13;
pub const FEATURE_REPORT_FIRMWARE_INFO: u8 = 0xA3;

/// Button bits of [Ds4Report::buttons]. The low nibble holds the hat switch.
pub mod buttons {
    pub const DPAD_NONE: u16 = 0x0008;
    pub const SQUARE: u16 = 0x0010;
    pub const CROSS: u16 = 0x0020;
    pub const CIRCLE: u16 = 0x0040;
    pub const TRIANGLE: u16 = 0x0080;
    pub const SHOULDER_LEFT: u16 = 0x0100;
    pub const SHOULDER_RIGHT: u16 = 0x0200;
    pub const TRIGGER_LEFT: u16 = 0x0400;
    pub const TRIGGER_RIGHT: u16 = 0x0800;
    pub const SHARE: u16 = 0x1000;
    pub const OPTIONS: u16 = 0x2000;
    pub const THUMB_LEFT: u16 = 0x4000;
    pub const THUMB_RIGHT: u16 = 0x8000;
}

/// Gamepad state submitted by an application
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "9")]
pub struct Ds4Report {
    #[packed_field(bytes = "0")]
    pub thumb_lx: u8,
    #[packed_field(bytes = "1")]
    pub thumb_ly: u8,
    #[packed_field(bytes = "2")]
    pub thumb_rx: u8,
    #[packed_field(bytes = "3")]
    pub thumb_ry: u8,
    #[packed_field(bytes = "4..=5", endian = "lsb")]
    pub buttons: u16,
    #[packed_field(bytes = "6")]
    pub special: u8,
    #[packed_field(bytes = "7")]
    pub trigger_l: u8,
    #[packed_field(bytes = "8")]
    pub trigger_r: u8,
}

impl Default for Ds4Report {
    fn default() -> Self {
        Self {
            thumb_lx: 0x80,
            thumb_ly: 0x80,
            thumb_rx: 0x80,
            thumb_ry: 0x80,
            buttons: buttons::DPAD_NONE,
            special: 0,
            trigger_l: 0,
            trigger_r: 0,
        }
    }
}

/// Output report 0x05 written by the host on endpoint 0x03
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "32")]
pub struct Ds4OutputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1")]
    pub flags: u8,
    #[packed_field(bytes = "4")]
    pub small_motor: u8,
    #[packed_field(bytes = "5")]
    pub large_motor: u8,
    #[packed_field(bytes = "6")]
    pub red: u8,
    #[packed_field(bytes = "7")]
    pub green: u8,
    #[packed_field(bytes = "8")]
    pub blue: u8,
    #[packed_field(bytes = "9")]
    pub flash_on: u8,
    #[packed_field(bytes = "10")]
    pub flash_off: u8,
}

/// Neutral USB input report as sent by an idle controller. Bytes 1..=9 are
/// replaced with the submitted [Ds4Report].
pub const DEFAULT_INPUT_REPORT: [u8; INPUT_REPORT_USB_SIZE] = [
    0x01, 0x80, 0x80, 0x80, 0x80, 0x08, 0x00, 0x00, 0x00, 0x00, 0xFD, 0x63, 0x06, 0x03, 0x00,
    0xFE, 0xFF, 0xFC, 0xFF, 0x79, 0xFD, 0x1B, 0x14, 0xD1, 0xE9, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x1B, 0x00, 0x00, 0x01, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];

/// Build a full 64 byte input report from the given gamepad state
pub fn input_report(report: &Ds4Report) -> Result<Vec<u8>, PackingError> {
    let mut data = DEFAULT_INPUT_REPORT.to_vec();
    let state = report.pack()?;
    data[1..1 + state.len()].copy_from_slice(&state);
    Ok(data)
}

//! Xbox One (GIP) report layouts
use packed_struct::prelude::*;

/// Size of the input packet delivered to the host
pub const XGIP_REPORT_SIZE: usize = 0x12;
/// Maximum size of a raw interrupt or notification payload
pub const XGIP_INTERRUPT_SIZE: usize = 64;
/// Number of interrupt packets that make up the system init sequence
pub const XGIP_SYS_INIT_PACKETS: usize = 0x0F;

/// GIP command id of input packets
pub const GIP_CMD_INPUT: u8 = 0x20;

/// Gamepad state submitted by an application
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "14")]
pub struct XgipReport {
    #[packed_field(bytes = "0")]
    pub buttons1: u8,
    #[packed_field(bytes = "1")]
    pub buttons2: u8,
    #[packed_field(bytes = "2..=3", endian = "lsb")]
    pub left_trigger: u16,
    #[packed_field(bytes = "4..=5", endian = "lsb")]
    pub right_trigger: u16,
    #[packed_field(bytes = "6..=7", endian = "lsb")]
    pub thumb_lx: i16,
    #[packed_field(bytes = "8..=9", endian = "lsb")]
    pub thumb_ly: i16,
    #[packed_field(bytes = "10..=11", endian = "lsb")]
    pub thumb_rx: i16,
    #[packed_field(bytes = "12..=13", endian = "lsb")]
    pub thumb_ry: i16,
}

/// Input packet delivered on endpoint 0x81
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "18")]
pub struct XgipInputPacket {
    #[packed_field(bytes = "0")]
    pub command: u8,
    #[packed_field(bytes = "1")]
    pub options: u8,
    #[packed_field(bytes = "2")]
    pub sequence: u8,
    #[packed_field(bytes = "3")]
    pub length: u8,
    #[packed_field(bytes = "4..=17")]
    pub report: XgipReport,
}

impl XgipInputPacket {
    pub fn new(sequence: u8, report: XgipReport) -> Self {
        Self {
            command: GIP_CMD_INPUT,
            options: 0x00,
            sequence,
            length: (XGIP_REPORT_SIZE - 4) as u8,
            report,
        }
    }
}

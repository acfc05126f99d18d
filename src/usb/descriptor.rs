//! Standard USB descriptor and setup packet layouts
use packed_struct::prelude::*;

pub const DEVICE_DESCRIPTOR_TYPE: u8 = 0x01;
pub const CONFIGURATION_DESCRIPTOR_TYPE: u8 = 0x02;
pub const STRING_DESCRIPTOR_TYPE: u8 = 0x03;
pub const INTERFACE_DESCRIPTOR_TYPE: u8 = 0x04;
pub const ENDPOINT_DESCRIPTOR_TYPE: u8 = 0x05;
pub const HID_DESCRIPTOR_TYPE: u8 = 0x21;
pub const REPORT_DESCRIPTOR_TYPE: u8 = 0x22;

pub const DEVICE_DESCRIPTOR_SIZE: usize = 0x12;

/// US English
pub const LANGUAGE_ID_EN_US: u16 = 0x0409;

/// Standard device descriptor
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "18")]
pub struct UsbDeviceDescriptor {
    #[packed_field(bytes = "0")]
    pub length: u8,
    #[packed_field(bytes = "1")]
    pub descriptor_type: u8,
    #[packed_field(bytes = "2..=3", endian = "lsb")]
    pub bcd_usb: u16,
    #[packed_field(bytes = "4")]
    pub device_class: u8,
    #[packed_field(bytes = "5")]
    pub device_subclass: u8,
    #[packed_field(bytes = "6")]
    pub device_protocol: u8,
    #[packed_field(bytes = "7")]
    pub max_packet_size0: u8,
    #[packed_field(bytes = "8..=9", endian = "lsb")]
    pub vendor_id: u16,
    #[packed_field(bytes = "10..=11", endian = "lsb")]
    pub product_id: u16,
    #[packed_field(bytes = "12..=13", endian = "lsb")]
    pub bcd_device: u16,
    #[packed_field(bytes = "14")]
    pub manufacturer: u8,
    #[packed_field(bytes = "15")]
    pub product: u8,
    #[packed_field(bytes = "16")]
    pub serial_number: u8,
    #[packed_field(bytes = "17")]
    pub num_configurations: u8,
}

impl Default for UsbDeviceDescriptor {
    fn default() -> Self {
        Self {
            length: DEVICE_DESCRIPTOR_SIZE as u8,
            descriptor_type: DEVICE_DESCRIPTOR_TYPE,
            bcd_usb: 0x0200,
            device_class: 0,
            device_subclass: 0,
            device_protocol: 0,
            max_packet_size0: 0x40,
            vendor_id: 0,
            product_id: 0,
            bcd_device: 0,
            manufacturer: 0,
            product: 0,
            serial_number: 0,
            num_configurations: 1,
        }
    }
}

/// Recipient and type bits of [SetupPacket::request_type]
pub mod request_type {
    pub const DEVICE_TO_HOST: u8 = 0x80;
    pub const CLASS: u8 = 0x20;
    pub const INTERFACE: u8 = 0x01;
}

/// HID class requests
pub mod hid_request {
    pub const GET_REPORT: u8 = 0x01;
    pub const GET_IDLE: u8 = 0x02;
    pub const GET_PROTOCOL: u8 = 0x03;
    pub const SET_REPORT: u8 = 0x09;
    pub const SET_IDLE: u8 = 0x0A;
    pub const SET_PROTOCOL: u8 = 0x0B;
}

/// HID report types found in the high byte of [SetupPacket::value]
pub mod hid_report_type {
    pub const INPUT: u8 = 0x01;
    pub const OUTPUT: u8 = 0x02;
    pub const FEATURE: u8 = 0x03;
}

/// Setup stage of a control transfer
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct SetupPacket {
    #[packed_field(bytes = "0")]
    pub request_type: u8,
    #[packed_field(bytes = "1")]
    pub request: u8,
    #[packed_field(bytes = "2..=3", endian = "lsb")]
    pub value: u16,
    #[packed_field(bytes = "4..=5", endian = "lsb")]
    pub index: u16,
    #[packed_field(bytes = "6..=7", endian = "lsb")]
    pub length: u16,
}

impl SetupPacket {
    /// Create a HID GET_REPORT request for the given feature report
    pub fn get_feature_report(report_id: u8, length: u16) -> Self {
        Self {
            request_type: request_type::DEVICE_TO_HOST
                | request_type::CLASS
                | request_type::INTERFACE,
            request: hid_request::GET_REPORT,
            value: ((hid_report_type::FEATURE as u16) << 8) | report_id as u16,
            index: 0,
            length,
        }
    }

    /// Create a HID SET_REPORT request for the given feature report
    pub fn set_feature_report(report_id: u8, length: u16) -> Self {
        Self {
            request_type: request_type::CLASS | request_type::INTERFACE,
            request: hid_request::SET_REPORT,
            value: ((hid_report_type::FEATURE as u16) << 8) | report_id as u16,
            index: 0,
            length,
        }
    }

    pub fn is_device_to_host(&self) -> bool {
        self.request_type & request_type::DEVICE_TO_HOST != 0
    }

    /// Report type and report id addressed by a HID report request
    pub fn report(&self) -> (u8, u8) {
        ((self.value >> 8) as u8, (self.value & 0xFF) as u8)
    }
}

/// Copy up to `length` bytes of the given descriptor table. A shorter
/// request receives a truncated copy.
pub fn copy_descriptor(table: &[u8], length: usize) -> Vec<u8> {
    table[..table.len().min(length)].to_vec()
}

/// Build a string descriptor for the given text (UTF-16LE)
pub fn string_descriptor(text: &str) -> Vec<u8> {
    let mut data = vec![0, STRING_DESCRIPTOR_TYPE];
    for unit in text.encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    data[0] = data.len().min(u8::MAX as usize) as u8;
    data
}

/// String descriptor zero listing the supported languages
pub fn language_descriptor() -> Vec<u8> {
    let id = LANGUAGE_ID_EN_US.to_le_bytes();
    vec![4, STRING_DESCRIPTOR_TYPE, id[0], id[1]]
}

use super::report::{
    FEATURE_REPORT_CALIBRATION, FEATURE_REPORT_FIRMWARE_INFO, FEATURE_REPORT_PAIRING_INFO,
};

/// HID report descriptor of the wired DualShock 4
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop Ctrls)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x09, 0x39, //   Usage (Hat switch)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x07, //   Logical Maximum (7)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (EnglishRotation: deg)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x42, //   Input (Data,Var,Abs,Null State)
    0x65, 0x00, //   Unit (None)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (0x01)
    0x29, 0x0E, //   Usage Maximum (0x0E)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x0E, //   Report Count (14)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x20, //   Usage (0x20)
    0x75, 0x06, //   Report Size (6)
    0x95, 0x01, //   Report Count (1)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x7F, //   Logical Maximum (127)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x05, 0x01, //   Usage Page (Generic Desktop Ctrls)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x21, //   Usage (0x21)
    0x95, 0x36, //   Report Count (54)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x85, 0x05, //   Report ID (5)
    0x09, 0x22, //   Usage (0x22)
    0x95, 0x1F, //   Report Count (31)
    0x91, 0x02, //   Output (Data,Var,Abs)
    0x85, 0x04, //   Report ID (4)
    0x09, 0x23, //   Usage (0x23)
    0x95, 0x24, //   Report Count (36)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x02, //   Report ID (2)
    0x09, 0x24, //   Usage (0x24)
    0x95, 0x24, //   Report Count (36)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x08, //   Report ID (8)
    0x09, 0x25, //   Usage (0x25)
    0x95, 0x03, //   Report Count (3)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x10, //   Report ID (16)
    0x09, 0x26, //   Usage (0x26)
    0x95, 0x04, //   Report Count (4)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x11, //   Report ID (17)
    0x09, 0x27, //   Usage (0x27)
    0x95, 0x02, //   Report Count (2)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x12, //   Report ID (18)
    0x06, 0x02, 0xFF, //   Usage Page (Vendor Defined 0xFF02)
    0x09, 0x21, //   Usage (0x21)
    0x95, 0x0F, //   Report Count (15)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x13, //   Report ID (19)
    0x09, 0x22, //   Usage (0x22)
    0x95, 0x16, //   Report Count (22)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x14, //   Report ID (20)
    0x06, 0x05, 0xFF, //   Usage Page (Vendor Defined 0xFF05)
    0x09, 0x20, //   Usage (0x20)
    0x95, 0x10, //   Report Count (16)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x85, 0x15, //   Report ID (21)
    0x09, 0x21, //   Usage (0x21)
    0x95, 0x2C, //   Report Count (44)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0x06, 0x80, 0xFF, //   Usage Page (Vendor Defined 0xFF80)
    0x85, 0xA3, //   Report ID (163)
    0x09, 0x20, //   Usage (0x20)
    0x95, 0x30, //   Report Count (48)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0xC0, // End Collection
];

const REPORT_DESCRIPTOR_LENGTH: usize = REPORT_DESCRIPTOR.len();

pub const DS4_DESCRIPTOR_SIZE: usize = 0x0029;

/// Configuration descriptor with a single HID interface
pub const CONFIGURATION_DESCRIPTOR: [u8; DS4_DESCRIPTOR_SIZE] = [
    0x09, // bLength
    0x02, // bDescriptorType (Configuration)
    0x29, 0x00, // wTotalLength 41
    0x01, // bNumInterfaces 1
    0x01, // bConfigurationValue
    0x00, // iConfiguration (String Index)
    0xC0, // bmAttributes Self Powered
    0xFA, // bMaxPower 500mA
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x00, // bInterfaceNumber 0
    0x00, // bAlternateSetting
    0x02, // bNumEndpoints 2
    0x03, // bInterfaceClass (HID)
    0x00, // bInterfaceSubClass
    0x00, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x09, // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID 1.11
    0x00, // bCountryCode
    0x01, // bNumDescriptors
    0x22, // bDescriptorType[0] (HID Report)
    (REPORT_DESCRIPTOR_LENGTH & 0xFF) as u8, // wDescriptorLength[0]
    (REPORT_DESCRIPTOR_LENGTH >> 8) as u8,
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x84, // bEndpointAddress (IN/D2H)
    0x03, // bmAttributes (Interrupt)
    0x40, 0x00, // wMaxPacketSize 64
    0x05, // bInterval 5
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x03, // bEndpointAddress (OUT/H2D)
    0x03, // bmAttributes (Interrupt)
    0x40, 0x00, // wMaxPacketSize 64
    0x05, // bInterval 5
];

/// Feature report 0x02 with IMU calibration data
pub const CALIBRATION_REPORT: [u8; 37] = [
    FEATURE_REPORT_CALIBRATION,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x87, 0x22, 0x7B, 0xDD, 0xB2, 0x22, 0x47, 0xDD, 0xBD,
    0x22, 0x43, 0xDD, 0x1C, 0x02, 0x1C, 0x02, 0x7F, 0x1E, 0x2E, 0xDF, 0x60, 0x1F, 0x4C, 0xE0,
    0x3A, 0x1D, 0xC6, 0xDE, 0x08, 0x00,
];

pub const PAIRING_INFO_SIZE: usize = 16;

/// Build feature report 0x12 with the device and paired host addresses.
/// Addresses are stored little-endian.
pub fn pairing_info_report(device_mac: &[u8; 6], host_mac: &[u8; 6]) -> Vec<u8> {
    let mut data = Vec::with_capacity(PAIRING_INFO_SIZE);
    data.push(FEATURE_REPORT_PAIRING_INFO);
    data.extend(device_mac.iter().rev());
    data.extend_from_slice(&[0x08, 0x25, 0x00]);
    data.extend(host_mac.iter().rev());
    data
}

pub const FIRMWARE_INFO_SIZE: usize = 49;

/// Build feature report 0xA3 with the firmware build date and versions
pub fn firmware_info_report() -> Vec<u8> {
    let mut data = vec![0; FIRMWARE_INFO_SIZE];
    data[0] = FEATURE_REPORT_FIRMWARE_INFO;
    let date = b"Sep 21 2018";
    let time = b"04:50:51";
    data[1..1 + date.len()].copy_from_slice(date);
    data[17..17 + time.len()].copy_from_slice(time);
    data[33..].copy_from_slice(&[
        0x01, 0x00, 0x31, 0x03, 0x00, 0x00, 0x00, 0x49, 0x00, 0x05, 0x00, 0x00, 0x80, 0x03, 0x00,
        0x00,
    ]);
    data
}

pub const XUSB_DESCRIPTOR_SIZE: usize = 0x0099;

/// Configuration descriptor of the wired Xbox 360 controller
pub const CONFIGURATION_DESCRIPTOR: [u8; XUSB_DESCRIPTOR_SIZE] = [
    0x09, // bLength
    0x02, // bDescriptorType (Configuration)
    0x99, 0x00, // wTotalLength 153
    0x04, // bNumInterfaces 4
    0x01, // bConfigurationValue
    0x00, // iConfiguration (String Index)
    0xA0, // bmAttributes Remote Wakeup
    0xFA, // bMaxPower 500mA
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x00, // bInterfaceNumber 0
    0x00, // bAlternateSetting
    0x02, // bNumEndpoints 2
    0xFF, // bInterfaceClass
    0x5D, // bInterfaceSubClass
    0x01, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x11, // bLength
    0x21, // bDescriptorType (HID)
    0x00, 0x01, // bcdHID 1.00
    0x01, // bCountryCode
    0x25, // bNumDescriptors
    0x81, // bDescriptorType[0] (Unknown 0x81)
    0x14, 0x00, // wDescriptorLength[0] 20
    0x00, // bDescriptorType[1] (Unknown 0x00)
    0x00, 0x00, // wDescriptorLength[1] 0
    0x13, // bDescriptorType[2] (Unknown 0x13)
    0x01, 0x08, // wDescriptorLength[2] 2049
    0x00, // bDescriptorType[3] (Unknown 0x00)
    0x00, //
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x81, // bEndpointAddress (IN/D2H)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x04, // bInterval 4
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x01, // bEndpointAddress (OUT/H2D)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x08, // bInterval 8
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x01, // bInterfaceNumber 1
    0x00, // bAlternateSetting
    0x04, // bNumEndpoints 4
    0xFF, // bInterfaceClass
    0x5D, // bInterfaceSubClass
    0x03, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x1B, // bLength
    0x21, // bDescriptorType (HID)
    0x00, 0x01, // bcdHID 1.00
    0x01, // bCountryCode
    0x01, // bNumDescriptors
    0x82, // bDescriptorType[0] (Unknown 0x82)
    0x40, 0x01, // wDescriptorLength[0] 320
    0x02, 0x20, 0x16, 0x83, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x16, 0x03, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, //
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x82, // bEndpointAddress (IN/D2H)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x02, // bInterval 2
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x02, // bEndpointAddress (OUT/H2D)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x04, // bInterval 4
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x83, // bEndpointAddress (IN/D2H)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x40, // bInterval 64
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x03, // bEndpointAddress (OUT/H2D)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x10, // bInterval 16
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x02, // bInterfaceNumber 2
    0x00, // bAlternateSetting
    0x01, // bNumEndpoints 1
    0xFF, // bInterfaceClass
    0x5D, // bInterfaceSubClass
    0x02, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x09, // bLength
    0x21, // bDescriptorType (HID)
    0x00, 0x01, // bcdHID 1.00
    0x01, // bCountryCode
    0x22, // bNumDescriptors
    0x84, // bDescriptorType[0] (Unknown 0x84)
    0x07, 0x00, // wDescriptorLength[0] 7
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x84, // bEndpointAddress (IN/D2H)
    0x03, // bmAttributes (Interrupt)
    0x20, 0x00, // wMaxPacketSize 32
    0x10, // bInterval 16
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x03, // bInterfaceNumber 3
    0x00, // bAlternateSetting
    0x00, // bNumEndpoints 0
    0xFF, // bInterfaceClass
    0xFD, // bInterfaceSubClass
    0x13, // bInterfaceProtocol
    0x04, // iInterface (String Index)
    //
    0x06, // bLength
    0x41, // bDescriptorType (Unknown)
    0x00, 0x01, 0x01, 0x03,
];

/// Packets returned on the first IN transfers of the data pipe, in order
pub const INIT_PACKETS: [&[u8]; 7] = [
    &[0x01, 0x03, 0x0E],
    &[0x02, 0x03, 0x00],
    &[0x03, 0x03, 0x03],
    &[0x08, 0x03, 0x00],
    &[
        0x00, 0x14, 0x00, 0x00, 0x00, 0x00, 0xE4, 0xF2, 0xB3, 0xF8, 0x49, 0xF3, 0xB0, 0xFC, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00,
    ],
    &[0x01, 0x03, 0x03],
    &[0x05, 0x03, 0x00],
];

/// Packet returned once on the first IN transfer of the control pipe
pub const CAPABILITIES_PACKET: [u8; 4] = [0x31, 0x3F, 0xCF, 0xDC];

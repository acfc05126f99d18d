pub const XGIP_DESCRIPTOR_SIZE: usize = 0x0040;

/// Configuration descriptor of the wired Xbox One controller
pub const CONFIGURATION_DESCRIPTOR: [u8; XGIP_DESCRIPTOR_SIZE] = [
    0x09, // bLength
    0x02, // bDescriptorType (Configuration)
    0x40, 0x00, // wTotalLength 64
    0x02, // bNumInterfaces 2
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
    0x47, // bInterfaceSubClass
    0xD0, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x81, // bEndpointAddress (IN/D2H)
    0x03, // bmAttributes (Interrupt)
    0x40, 0x00, // wMaxPacketSize 64
    0x04, // bInterval 4
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x01, // bEndpointAddress (OUT/H2D)
    0x03, // bmAttributes (Interrupt)
    0x40, 0x00, // wMaxPacketSize 64
    0x04, // bInterval 4
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x01, // bInterfaceNumber 1
    0x00, // bAlternateSetting
    0x00, // bNumEndpoints 0
    0xFF, // bInterfaceClass
    0x47, // bInterfaceSubClass
    0xD0, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x09, // bLength
    0x04, // bDescriptorType (Interface)
    0x01, // bInterfaceNumber 1
    0x01, // bAlternateSetting
    0x02, // bNumEndpoints 2
    0xFF, // bInterfaceClass
    0x47, // bInterfaceSubClass
    0xD0, // bInterfaceProtocol
    0x00, // iInterface (String Index)
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x02, // bEndpointAddress (OUT/H2D)
    0x01, // bmAttributes (Isochronous)
    0xE0, 0x00, // wMaxPacketSize 224
    0x01, // bInterval 1
    //
    0x07, // bLength
    0x05, // bDescriptorType (Endpoint)
    0x83, // bEndpointAddress (IN/D2H)
    0x01, // bmAttributes (Isochronous)
    0x80, 0x00, // wMaxPacketSize 128
    0x01, // bInterval 1
];

//! Transfer and configuration records exchanged with the consuming USB stack
use std::fmt::Display;

/// Opaque handle the consumer uses to address an interface
pub const INTERFACE_HANDLE: u32 = 0xFFFF_0000;
/// Largest transfer accepted on any pipe
pub const MAX_TRANSFER_SIZE: u32 = 0x0040_0000;

/// Opaque pipe handle. The low byte carries the endpoint address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeHandle(pub u32);

impl PipeHandle {
    pub fn for_endpoint(address: u8) -> Self {
        PipeHandle(INTERFACE_HANDLE | address as u32)
    }

    pub fn endpoint(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn direction(&self) -> TransferDirection {
        if self.endpoint() & 0x80 != 0 {
            TransferDirection::In
        } else {
            TransferDirection::Out
        }
    }
}

impl Display for PipeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeType {
    Control = 0,
    Isochronous = 1,
    Bulk = 2,
    Interrupt = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Device to host
    In,
    /// Host to device
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeInformation {
    pub max_packet_size: u16,
    pub endpoint_address: u8,
    pub interval: u8,
    pub pipe_type: PipeType,
    pub handle: PipeHandle,
    pub max_transfer_size: u32,
    pub flags: u32,
}

impl PipeInformation {
    /// Interrupt pipe for the given endpoint
    pub fn interrupt(endpoint_address: u8, max_packet_size: u16, interval: u8) -> Self {
        Self {
            max_packet_size,
            endpoint_address,
            interval,
            pipe_type: PipeType::Interrupt,
            handle: PipeHandle::for_endpoint(endpoint_address),
            max_transfer_size: MAX_TRANSFER_SIZE,
            flags: 0,
        }
    }

    /// Isochronous pipe for the given endpoint
    pub fn isochronous(endpoint_address: u8, max_packet_size: u16, interval: u8) -> Self {
        Self {
            pipe_type: PipeType::Isochronous,
            ..Self::interrupt(endpoint_address, max_packet_size, interval)
        }
    }
}

/// One interface of a configuration selected by the consumer. The
/// consumer provides the interface number and alternate setting, the
/// device fills in everything else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceInformation {
    pub interface_number: u8,
    pub alternate_setting: u8,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
    pub handle: u32,
    pub pipes: Vec<PipeInformation>,
}

impl InterfaceInformation {
    pub fn new(interface_number: u8, alternate_setting: u8) -> Self {
        Self {
            interface_number,
            alternate_setting,
            ..Default::default()
        }
    }

    /// Fill in the class triple, interface handle and pipe table
    pub fn fill(&mut self, class: u8, subclass: u8, protocol: u8, pipes: Vec<PipeInformation>) {
        self.class = class;
        self.subclass = subclass;
        self.protocol = protocol;
        self.handle = INTERFACE_HANDLE;
        self.pipes = pipes;
    }
}

/// Bulk or interrupt transfer issued by the consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptTransfer {
    pub pipe: PipeHandle,
    /// Data written by the host for OUT transfers
    pub buffer: Vec<u8>,
    /// Transfer buffer length. For IN transfers this is the capacity.
    pub length: usize,
}

impl InterruptTransfer {
    /// IN transfer with the given capacity
    pub fn read(endpoint: u8, length: usize) -> Self {
        Self {
            pipe: PipeHandle::for_endpoint(endpoint),
            buffer: Vec::new(),
            length,
        }
    }

    /// OUT transfer carrying the given data
    pub fn write(endpoint: u8, data: &[u8]) -> Self {
        Self {
            pipe: PipeHandle::for_endpoint(endpoint),
            buffer: data.to_vec(),
            length: data.len(),
        }
    }

    pub fn direction(&self) -> TransferDirection {
        self.pipe.direction()
    }

    pub fn endpoint(&self) -> u8 {
        self.pipe.endpoint()
    }
}

use std::fmt::Display;

/// Completion status of a bus request. Values mirror the NTSTATUS codes
/// used by the wire protocol so clients can compare them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    Success = 0x0000_0000,
    /// The request was parked and will be completed later. Never sent to a
    /// client as a final status.
    Pending = 0x0000_0103,
    InvalidParameter = 0xC000_000D,
    NoSuchDevice = 0xC000_000E,
    InvalidDeviceRequest = 0xC000_0010,
    AccessDenied = 0xC000_0022,
    BufferTooSmall = 0xC000_0023,
    ObjectNameCollision = 0xC000_0035,
    InsufficientResources = 0xC000_009A,
    NotSupported = 0xC000_00BB,
    Cancelled = 0xC000_0120,
    DeviceRemoved = 0xC000_02B6,
    InvalidDeviceObjectParameter = 0xC000_0369,
}

impl Status {
    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }

    pub fn to_u32(&self) -> u32 {
        *self as u32
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        let status = match value {
            0x0000_0000 => Status::Success,
            0x0000_0103 => Status::Pending,
            0xC000_000D => Status::InvalidParameter,
            0xC000_000E => Status::NoSuchDevice,
            0xC000_0010 => Status::InvalidDeviceRequest,
            0xC000_0022 => Status::AccessDenied,
            0xC000_0023 => Status::BufferTooSmall,
            0xC000_0035 => Status::ObjectNameCollision,
            0xC000_009A => Status::InsufficientResources,
            0xC000_00BB => Status::NotSupported,
            0xC000_0120 => Status::Cancelled,
            0xC000_02B6 => Status::DeviceRemoved,
            0xC000_0369 => Status::InvalidDeviceObjectParameter,
            _ => return None,
        };
        Some(status)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Status::Success => "STATUS_SUCCESS",
            Status::Pending => "STATUS_PENDING",
            Status::InvalidParameter => "STATUS_INVALID_PARAMETER",
            Status::NoSuchDevice => "STATUS_NO_SUCH_DEVICE",
            Status::InvalidDeviceRequest => "STATUS_INVALID_DEVICE_REQUEST",
            Status::AccessDenied => "STATUS_ACCESS_DENIED",
            Status::BufferTooSmall => "STATUS_BUFFER_TOO_SMALL",
            Status::ObjectNameCollision => "STATUS_OBJECT_NAME_COLLISION",
            Status::InsufficientResources => "STATUS_INSUFFICIENT_RESOURCES",
            Status::NotSupported => "STATUS_NOT_SUPPORTED",
            Status::Cancelled => "STATUS_CANCELLED",
            Status::DeviceRemoved => "STATUS_DEVICE_REMOVED",
            Status::InvalidDeviceObjectParameter => "STATUS_INVALID_DEVICE_OBJECT_PARAMETER",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.to_u32())
    }
}

impl From<Status> for u32 {
    fn from(status: Status) -> Self {
        status.to_u32()
    }
}

impl std::error::Error for Status {}

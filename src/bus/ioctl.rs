//! Control codes understood by the bus. Codes are laid out the way the
//! Windows DDK `CTL_CODE` macro lays them out. Opcodes that hand data back
//! to the caller also require read access.
use std::fmt::Display;

const FILE_DEVICE_BUS_EXTENDER: u32 = 0x0000_002A;
const METHOD_BUFFERED: u32 = 0;
const FILE_READ_DATA: u32 = 0x0001;
const FILE_WRITE_DATA: u32 = 0x0002;
const IOCTL_BASE: u32 = 0x801;

const fn ctl_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

/// Code of a request that only carries input
const fn write_code(offset: u32) -> u32 {
    ctl_code(
        FILE_DEVICE_BUS_EXTENDER,
        IOCTL_BASE + offset,
        METHOD_BUFFERED,
        FILE_WRITE_DATA,
    )
}

/// Code of a request that returns output
const fn read_write_code(offset: u32) -> u32 {
    ctl_code(
        FILE_DEVICE_BUS_EXTENDER,
        IOCTL_BASE + offset,
        METHOD_BUFFERED,
        FILE_READ_DATA | FILE_WRITE_DATA,
    )
}

/// Opcodes accepted by the control dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IoControlCode {
    PluginTarget = write_code(0x000),
    UnplugTarget = write_code(0x001),
    CheckVersion = write_code(0x003),
    XusbRequestNotification = read_write_code(0x200),
    XusbSubmitReport = write_code(0x201),
    Ds4SubmitReport = write_code(0x202),
    Ds4RequestNotification = read_write_code(0x203),
    XgipSubmitReport = write_code(0x204),
    XgipSubmitInterrupt = write_code(0x205),
    XusbGetUserIndex = read_write_code(0x206),
    XgipRequestNotification = read_write_code(0x207),
}

impl IoControlCode {
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Returns true if the opcode hands data back to the caller
    pub fn has_output(&self) -> bool {
        self.code() & (FILE_READ_DATA << 14) != 0
    }

    /// Returns all supported codes
    pub fn supported_codes() -> Vec<IoControlCode> {
        vec![
            IoControlCode::PluginTarget,
            IoControlCode::UnplugTarget,
            IoControlCode::CheckVersion,
            IoControlCode::XusbRequestNotification,
            IoControlCode::XusbSubmitReport,
            IoControlCode::Ds4SubmitReport,
            IoControlCode::Ds4RequestNotification,
            IoControlCode::XgipSubmitReport,
            IoControlCode::XgipSubmitInterrupt,
            IoControlCode::XusbGetUserIndex,
            IoControlCode::XgipRequestNotification,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            IoControlCode::PluginTarget => "IOCTL_BUS_PLUGIN_TARGET",
            IoControlCode::UnplugTarget => "IOCTL_BUS_UNPLUG_TARGET",
            IoControlCode::CheckVersion => "IOCTL_BUS_CHECK_VERSION",
            IoControlCode::XusbRequestNotification => "IOCTL_XUSB_REQUEST_NOTIFICATION",
            IoControlCode::XusbSubmitReport => "IOCTL_XUSB_SUBMIT_REPORT",
            IoControlCode::Ds4SubmitReport => "IOCTL_DS4_SUBMIT_REPORT",
            IoControlCode::Ds4RequestNotification => "IOCTL_DS4_REQUEST_NOTIFICATION",
            IoControlCode::XgipSubmitReport => "IOCTL_XGIP_SUBMIT_REPORT",
            IoControlCode::XgipSubmitInterrupt => "IOCTL_XGIP_SUBMIT_INTERRUPT",
            IoControlCode::XusbGetUserIndex => "IOCTL_XUSB_GET_USER_INDEX",
            IoControlCode::XgipRequestNotification => "IOCTL_XGIP_REQUEST_NOTIFICATION",
        }
    }
}

impl TryFrom<u32> for IoControlCode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        IoControlCode::supported_codes()
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(value)
    }
}

impl Display for IoControlCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.code())
    }
}

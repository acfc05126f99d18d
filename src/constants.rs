pub const BUS_NAME: &str = "org.shadowblip.PadBus";
pub const BUS_PREFIX: &str = "/org/shadowblip/PadBus";
pub const BUS_PATH: &str = "/org/shadowblip/PadBus/Bus";
pub const CHILDREN_PATH: &str = "/org/shadowblip/PadBus/devices";

/// Version of the binary control protocol. Clients must send this exact
/// value with a CheckVersion request.
pub const COMMON_VERSION: u32 = 0x0001;

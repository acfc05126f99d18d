use tokio::sync::mpsc;

use crate::usb::{
    descriptor::SetupPacket,
    urb::{InterfaceInformation, InterruptTransfer},
};

use super::{
    device::ChildSummary,
    request::{IoRequest, PendingRequest, RequestId},
    status::Status,
    CallerId, Origin,
};

/// Bus commands define all the different ways to interact with the
/// [super::manager::BusManager] over a channel. These commands are processed
/// in order by a single task, so every operation observes a consistent
/// registry.
#[derive(Debug)]
pub enum BusCommand {
    /// Control request from an application or in-process component
    DeviceControl(IoRequest),
    /// Interrupt or bulk transfer issued by the consuming USB stack
    SubmitTransfer {
        serial: u32,
        transfer: InterruptTransfer,
        request: PendingRequest,
    },
    SelectConfiguration {
        serial: u32,
        interfaces: Vec<InterfaceInformation>,
        reply: mpsc::Sender<Result<Vec<InterfaceInformation>, Status>>,
    },
    GetDescriptor {
        serial: u32,
        descriptor_type: u8,
        index: u8,
        length: usize,
        reply: mpsc::Sender<Result<Vec<u8>, Status>>,
    },
    ControlTransfer {
        serial: u32,
        setup: SetupPacket,
        data: Vec<u8>,
        reply: mpsc::Sender<Result<Vec<u8>, Status>>,
    },
    /// Cancel one parked request on behalf of the given origin
    Cancel {
        id: RequestId,
        origin: Origin,
    },
    /// Cancel every request the origin has parked on one of its devices
    CancelRequests {
        serial: u32,
        origin: Origin,
        reply: mpsc::Sender<Result<usize, Status>>,
    },
    /// The given caller went away. Unplug everything it owns.
    ReleaseOwner(CallerId),
    GetChildren(mpsc::Sender<Vec<ChildSummary>>),
    Stop,
}

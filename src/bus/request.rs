use std::fmt::Display;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::bus::{status::Status, Origin};

/// Unique identifier of an in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Final result of a request. The length of `data` is the information
/// value reported to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: Status,
    pub data: Vec<u8>,
}

impl Completion {
    pub fn new(status: Status, data: Vec<u8>) -> Self {
        Self { status, data }
    }

    /// Successful completion carrying the given data
    pub fn success(data: Vec<u8>) -> Self {
        Self::new(Status::Success, data)
    }

    /// Completion with the given status and no data
    pub fn status(status: Status) -> Self {
        Self::new(status, Vec::new())
    }

    /// Number of bytes returned to the requester
    pub fn information(&self) -> usize {
        self.data.len()
    }
}

impl From<Status> for Completion {
    fn from(status: Status) -> Self {
        Completion::status(status)
    }
}

/// Sending half of a request's completion channel. The requester owns the
/// receiving half and awaits exactly one [Completion].
#[derive(Debug, Clone)]
pub struct Completer {
    tx: mpsc::Sender<Completion>,
}

impl Completer {
    /// Create a new completion channel for a single request
    pub fn channel() -> (Self, mpsc::Receiver<Completion>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Deliver the completion. Returns false if the requester went away.
    pub fn complete(&self, completion: Completion) -> bool {
        match self.tx.try_send(completion) {
            Ok(_) => true,
            Err(TrySendError::Closed(_)) => false,
            Err(TrySendError::Full(_)) => {
                log::warn!("Request was already completed");
                false
            }
        }
    }

    /// Returns true if the requester is no longer waiting
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A request that may be parked in a device queue until data is available
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: RequestId,
    /// Number of bytes the requester can receive
    pub capacity: usize,
    /// Who issued the request. Transfers from the consuming stack are
    /// internal.
    pub origin: Origin,
    completer: Completer,
}

impl PendingRequest {
    pub fn new(id: RequestId, capacity: usize, completer: Completer) -> Self {
        Self {
            id,
            capacity,
            origin: Origin::Internal,
            completer,
        }
    }

    /// Attribute the request to the given origin
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Returns true if the given origin may cancel this request. Internal
    /// callers may cancel anything, applications only their own requests.
    pub fn is_cancellable_by(&self, origin: &Origin) -> bool {
        matches!(origin, Origin::Internal) || &self.origin == origin
    }

    /// Complete the request, truncating the data to the requester's
    /// capacity. Returns false if the requester went away.
    pub fn complete(self, mut completion: Completion) -> bool {
        completion.data.truncate(self.capacity);
        self.completer.complete(completion)
    }

    /// Returns true if nobody is waiting for this request anymore
    pub fn is_abandoned(&self) -> bool {
        self.completer.is_closed()
    }
}

/// Kind of request delivered to the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorFunction {
    /// Control request from an application
    DeviceControl,
    /// Control request from another in-process component
    InternalDeviceControl,
    Read,
    Write,
}

/// A request addressed to the bus control surface
#[derive(Debug)]
pub struct IoRequest {
    pub id: RequestId,
    pub major: MajorFunction,
    pub code: u32,
    pub input: Vec<u8>,
    /// Input length declared by the caller
    pub input_length: usize,
    pub output_capacity: usize,
    pub origin: Origin,
    pub completer: Completer,
}

impl IoRequest {
    /// Create a new device control request. The declared input length is
    /// taken from the input buffer.
    pub fn device_control(
        id: RequestId,
        code: u32,
        input: Vec<u8>,
        output_capacity: usize,
        origin: Origin,
        completer: Completer,
    ) -> Self {
        let major = match origin {
            Origin::Internal => MajorFunction::InternalDeviceControl,
            Origin::Application(_) => MajorFunction::DeviceControl,
        };
        Self {
            id,
            major,
            code,
            input_length: input.len(),
            input,
            output_capacity,
            origin,
            completer,
        }
    }

    /// Returns a pending request that completes this request
    pub fn pending(&self) -> PendingRequest {
        PendingRequest::new(self.id, self.output_capacity, self.completer.clone())
            .with_origin(self.origin.clone())
    }
}

/// Result of handling a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request completed synchronously
    Immediate(Completion),
    /// The request was parked and completes later
    Deferred(RequestId),
}

impl Outcome {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Outcome::Deferred(_))
    }

    /// Status of the outcome. Deferred requests report [Status::Pending].
    pub fn status(&self) -> Status {
        match self {
            Outcome::Immediate(completion) => completion.status,
            Outcome::Deferred(_) => Status::Pending,
        }
    }
}

impl From<Status> for Outcome {
    fn from(status: Status) -> Self {
        Outcome::Immediate(Completion::status(status))
    }
}

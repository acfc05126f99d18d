use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use packed_struct::PackedStruct;
use thiserror::Error;
use tokio::sync::mpsc::{channel, error::SendTimeoutError, Receiver, Sender};

use crate::usb::{
    descriptor::SetupPacket,
    urb::{InterfaceInformation, InterruptTransfer},
    Family,
};

use super::{
    command::BusCommand,
    device::ChildSummary,
    ioctl::IoControlCode,
    protocol::{CheckVersion, PluginTarget, UnplugTarget},
    request::{Completer, Completion, IoRequest, PendingRequest, RequestId},
    status::Status,
    CallerId, Origin,
};

/// Maximum duration to wait for a response from a command. If this timeout
/// is reached, that typically indicates a deadlock somewhere in the code.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Possible errors for a bus client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to send command to bus: {0}")]
    SendError(String),
    #[error("service encountered an error processing the request: {0}")]
    ServiceError(Box<dyn std::error::Error + Send + Sync>),
    #[error("bus no longer exists")]
    ChannelClosed,
}

/// A client for communicating with the bus manager. Clients are cheap to
/// clone and share one request id sequence.
#[derive(Debug, Clone)]
pub struct BusClient {
    tx: Sender<BusCommand>,
    next_id: Arc<AtomicU64>,
}

impl From<Sender<BusCommand>> for BusClient {
    fn from(tx: Sender<BusCommand>) -> Self {
        BusClient::new(tx)
    }
}

impl BusClient {
    pub fn new(tx: Sender<BusCommand>) -> Self {
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns a new unique request id
    pub fn next_id(&self) -> RequestId {
        RequestId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Send the given command to the bus. This method uses a timeout to
    /// detect potential deadlocks.
    async fn send(&self, cmd: BusCommand) -> Result<(), ClientError> {
        let result = self.tx.send_timeout(cmd, DEFAULT_TIMEOUT).await;
        let Err(err) = result else {
            return Ok(());
        };
        match err {
            SendTimeoutError::Timeout(ref cmd) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} sending command to bus: {cmd:?}");
                Err(ClientError::SendError(err.to_string()))
            }
            SendTimeoutError::Closed(_) => Err(ClientError::ChannelClosed),
        }
    }

    /// Use the given receiver to wait for a response from the bus. This
    /// method uses a timeout to detect potential deadlocks.
    async fn recv<T>(mut rx: Receiver<T>) -> Result<T, ClientError> {
        match tokio::time::timeout(DEFAULT_TIMEOUT, rx.recv()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ClientError::ChannelClosed),
            Err(_) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} waiting for response from bus");
                Err(ClientError::ChannelClosed)
            }
        }
    }

    /// Send a control request to the bus without waiting for it to
    /// complete. The returned receiver yields the completion once the bus
    /// finishes the request, which may take indefinitely for pending
    /// requests.
    pub async fn start_device_control(
        &self,
        code: u32,
        input: Vec<u8>,
        output_capacity: usize,
        origin: Origin,
    ) -> Result<(RequestId, Receiver<Completion>), ClientError> {
        let id = self.next_id();
        let (completer, rx) = Completer::channel();
        let request = IoRequest::device_control(id, code, input, output_capacity, origin, completer);
        self.send(BusCommand::DeviceControl(request)).await?;
        Ok((id, rx))
    }

    /// Send a control request to the bus and wait for it to complete
    pub async fn device_control(
        &self,
        code: u32,
        input: Vec<u8>,
        output_capacity: usize,
        origin: Origin,
    ) -> Result<Completion, ClientError> {
        let (_, mut rx) = self
            .start_device_control(code, input, output_capacity, origin)
            .await?;
        rx.recv().await.ok_or(ClientError::ChannelClosed)
    }

    /// Check that the bus speaks the same protocol version as this client
    pub async fn check_version(&self, origin: Origin) -> Result<Status, ClientError> {
        let input = CheckVersion::default()
            .pack()
            .map_err(|e| ClientError::ServiceError(e.into()))?;
        let code = IoControlCode::CheckVersion.code();
        let completion = self.device_control(code, input.to_vec(), 0, origin).await?;
        Ok(completion.status)
    }

    /// Plug in a new device of the given family with the family's default
    /// vendor and product id
    pub async fn plug_in(
        &self,
        serial: u32,
        family: Family,
        origin: Origin,
    ) -> Result<Status, ClientError> {
        let input = PluginTarget::new(serial, family.target_type())
            .pack()
            .map_err(|e| ClientError::ServiceError(e.into()))?;
        let code = IoControlCode::PluginTarget.code();
        let completion = self.device_control(code, input.to_vec(), 0, origin).await?;
        Ok(completion.status)
    }

    /// Unplug the device with the given serial
    pub async fn unplug(&self, serial: u32, origin: Origin) -> Result<Status, ClientError> {
        let input = UnplugTarget::new(serial)
            .pack()
            .map_err(|e| ClientError::ServiceError(e.into()))?;
        let code = IoControlCode::UnplugTarget.code();
        let completion = self.device_control(code, input.to_vec(), 0, origin).await?;
        Ok(completion.status)
    }

    /// Issue an interrupt transfer on the given device without waiting for
    /// it to complete
    pub async fn submit_transfer(
        &self,
        serial: u32,
        transfer: InterruptTransfer,
    ) -> Result<(RequestId, Receiver<Completion>), ClientError> {
        let id = self.next_id();
        let (completer, rx) = Completer::channel();
        let request = PendingRequest::new(id, transfer.length, completer);
        self.send(BusCommand::SubmitTransfer {
            serial,
            transfer,
            request,
        })
        .await?;
        Ok((id, rx))
    }

    /// Issue an interrupt transfer on the given device and wait for it to
    /// complete
    pub async fn transfer(
        &self,
        serial: u32,
        transfer: InterruptTransfer,
    ) -> Result<Completion, ClientError> {
        let (_, mut rx) = self.submit_transfer(serial, transfer).await?;
        rx.recv().await.ok_or(ClientError::ChannelClosed)
    }

    /// Select the configuration of the given device and return the filled
    /// interfaces
    pub async fn select_configuration(
        &self,
        serial: u32,
        interfaces: Vec<InterfaceInformation>,
    ) -> Result<Result<Vec<InterfaceInformation>, Status>, ClientError> {
        let (tx, rx) = channel(1);
        self.send(BusCommand::SelectConfiguration {
            serial,
            interfaces,
            reply: tx,
        })
        .await?;
        Self::recv(rx).await
    }

    /// Get up to `length` bytes of a descriptor of the given device
    pub async fn get_descriptor(
        &self,
        serial: u32,
        descriptor_type: u8,
        index: u8,
        length: usize,
    ) -> Result<Result<Vec<u8>, Status>, ClientError> {
        let (tx, rx) = channel(1);
        self.send(BusCommand::GetDescriptor {
            serial,
            descriptor_type,
            index,
            length,
            reply: tx,
        })
        .await?;
        Self::recv(rx).await
    }

    /// Issue a class specific control transfer on the given device
    pub async fn control_transfer(
        &self,
        serial: u32,
        setup: SetupPacket,
        data: Vec<u8>,
    ) -> Result<Result<Vec<u8>, Status>, ClientError> {
        let (tx, rx) = channel(1);
        self.send(BusCommand::ControlTransfer {
            serial,
            setup,
            data,
            reply: tx,
        })
        .await?;
        Self::recv(rx).await
    }

    /// Cancel a parked request. Applications can only cancel their own
    /// requests.
    pub async fn cancel(&self, id: RequestId, origin: Origin) -> Result<(), ClientError> {
        self.send(BusCommand::Cancel { id, origin }).await
    }

    /// Cancel every request the caller has parked on the given device.
    /// Returns the number of cancelled requests.
    pub async fn cancel_requests(
        &self,
        serial: u32,
        origin: Origin,
    ) -> Result<Result<usize, Status>, ClientError> {
        let (tx, rx) = channel(1);
        self.send(BusCommand::CancelRequests {
            serial,
            origin,
            reply: tx,
        })
        .await?;
        Self::recv(rx).await
    }

    /// Unplug every device owned by the given caller
    pub async fn release_owner(&self, caller: CallerId) -> Result<(), ClientError> {
        self.send(BusCommand::ReleaseOwner(caller)).await
    }

    /// Get a summary of every live child device
    pub async fn get_children(&self) -> Result<Vec<ChildSummary>, ClientError> {
        let (tx, rx) = channel(1);
        self.send(BusCommand::GetChildren(tx)).await?;
        Self::recv(rx).await
    }

    /// Stop the bus, unplugging every device
    pub async fn stop(&self) -> Result<(), ClientError> {
        self.send(BusCommand::Stop).await
    }
}

//! Decodes control requests, validates them and routes them to the child
//! device they address.
use packed_struct::prelude::*;

use crate::{
    constants::COMMON_VERSION,
    usb::{
        descriptor::SetupPacket,
        urb::{InterfaceInformation, InterruptTransfer},
        Family, TargetReport,
    },
};

use super::{
    device::{ChildDevice, ChildSummary},
    ioctl::IoControlCode,
    protocol::{
        decode_request, decode_targeted, CheckVersion, Ds4RequestNotification, Ds4SubmitReport,
        PluginTarget, TargetedRequest, UnplugTarget, WireRequest, XgipRequestNotification,
        XgipSubmitInterrupt, XgipSubmitReport, XusbGetUserIndex, XusbRequestNotification,
        XusbSubmitReport,
    },
    registry::ChildRegistry,
    request::{Completion, IoRequest, MajorFunction, Outcome, PendingRequest, RequestId},
    status::Status,
    BusEvent, CallerId, Origin,
};

/// Owns the child registry and serves every request addressed to the bus
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: ChildRegistry,
    events: Vec<BusEvent>,
}

impl Dispatcher {
    pub fn new(registry: ChildRegistry) -> Self {
        Self {
            registry,
            events: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ChildRegistry {
        &self.registry
    }

    /// Returns and clears the enumeration events produced so far
    pub fn take_events(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.events)
    }

    /// Handle the given request. Requests that finish synchronously are
    /// completed before this returns. Deferred requests are completed later
    /// by whoever pops them from their queue.
    pub fn handle(&mut self, request: IoRequest) -> Outcome {
        let reply = request.pending();
        let outcome = self.route(&request);
        match &outcome {
            Outcome::Immediate(completion) => {
                log::trace!(
                    "Completing request {} with {} ({} bytes)",
                    request.id,
                    completion.status,
                    completion.information()
                );
                reply.complete(completion.clone());
            }
            Outcome::Deferred(id) => log::trace!("Request {id} is pending"),
        }
        outcome
    }

    fn route(&mut self, request: &IoRequest) -> Outcome {
        match request.major {
            MajorFunction::DeviceControl => self.device_control(request, &request.origin),
            MajorFunction::InternalDeviceControl => self.internal_device_control(request),
            MajorFunction::Read | MajorFunction::Write => {
                log::debug!("Rejecting {:?} request {}", request.major, request.id);
                Status::InvalidDeviceRequest.into()
            }
        }
    }

    /// Requests from other in-process components. Only plug-in and unplug
    /// are recognized, and ownership checks are bypassed.
    fn internal_device_control(&mut self, request: &IoRequest) -> Outcome {
        match IoControlCode::try_from(request.code) {
            Ok(IoControlCode::PluginTarget) | Ok(IoControlCode::UnplugTarget) => {
                self.device_control(request, &Origin::Internal)
            }
            _ => {
                log::warn!(
                    "Unknown internal I/O control code 0x{:08X}",
                    request.code
                );
                Status::InvalidParameter.into()
            }
        }
    }

    fn device_control(&mut self, request: &IoRequest, origin: &Origin) -> Outcome {
        let Ok(code) = IoControlCode::try_from(request.code) else {
            log::warn!("Unknown I/O control code 0x{:08X}", request.code);
            return Status::InvalidParameter.into();
        };
        log::trace!("Handling {code} for request {}", request.id);

        let input = request.input.as_slice();
        let declared = request.input_length;
        let result = match code {
            IoControlCode::CheckVersion => self.check_version(input, declared),
            IoControlCode::PluginTarget => self.plug_in(input, declared, origin),
            IoControlCode::UnplugTarget => self.unplug(input, declared, origin),
            IoControlCode::XusbSubmitReport => {
                decode_targeted::<XusbSubmitReport>(input, declared).and_then(|r| {
                    self.submit_report(r.serial_no, TargetReport::Xusb(r.report), origin)
                })
            }
            IoControlCode::Ds4SubmitReport => decode_targeted::<Ds4SubmitReport>(input, declared)
                .and_then(|r| {
                    self.submit_report(r.serial_no, TargetReport::Ds4(r.report), origin)
                }),
            IoControlCode::XgipSubmitReport => {
                decode_targeted::<XgipSubmitReport>(input, declared).and_then(|r| {
                    self.submit_report(r.serial_no, TargetReport::Xgip(r.report), origin)
                })
            }
            IoControlCode::XgipSubmitInterrupt => self.submit_interrupt(input, declared, origin),
            IoControlCode::XusbRequestNotification => self
                .request_notification::<XusbRequestNotification>(
                    request,
                    Family::Xusb,
                    origin,
                ),
            IoControlCode::Ds4RequestNotification => self
                .request_notification::<Ds4RequestNotification>(request, Family::Ds4, origin),
            IoControlCode::XgipRequestNotification => self
                .request_notification::<XgipRequestNotification>(
                    request,
                    Family::Xgip,
                    origin,
                ),
            IoControlCode::XusbGetUserIndex => self.get_user_index(request, origin),
        };

        match result {
            Ok(outcome) => outcome,
            Err(status) => {
                log::debug!("{code} failed with {status}");
                status.into()
            }
        }
    }

    fn check_version(&mut self, input: &[u8], declared: usize) -> Result<Outcome, Status> {
        let request: CheckVersion = decode_request(input, declared)?;
        if request.version != COMMON_VERSION {
            log::warn!(
                "Client protocol version 0x{:04X} does not match 0x{COMMON_VERSION:04X}",
                request.version
            );
            return Err(Status::NotSupported);
        }
        Ok(Status::Success.into())
    }

    fn plug_in(&mut self, input: &[u8], declared: usize, origin: &Origin) -> Result<Outcome, Status> {
        let request: PluginTarget = decode_request(input, declared)?;
        if request.serial_no == 0 {
            log::warn!("Invalid serial 0 submitted");
            return Err(Status::InvalidParameter);
        }
        let Some(family) = Family::from_target_type(request.target_type) else {
            log::warn!("Unknown target type {}", request.target_type);
            return Err(Status::NotSupported);
        };

        let device = self.registry.plug_in(
            request.serial_no,
            family,
            request.vendor_id,
            request.product_id,
            origin,
        )?;
        self.events.push(BusEvent::ChildArrived {
            serial: device.serial(),
            family,
            identity: device.identity(),
        });

        Ok(Status::Success.into())
    }

    fn unplug(&mut self, input: &[u8], declared: usize, origin: &Origin) -> Result<Outcome, Status> {
        let request: UnplugTarget = decode_targeted(input, declared)?;
        let drained = self.registry.unplug(request.serial_no, origin)?;
        self.events.push(BusEvent::ChildRemoved {
            serial: request.serial_no,
            drained,
        });
        Ok(Status::Success.into())
    }

    /// Look up an owned device of the given family
    fn lookup_family(
        &mut self,
        serial: u32,
        family: Family,
        origin: &Origin,
    ) -> Result<&mut ChildDevice, Status> {
        let device = self.registry.lookup_owned(serial, origin)?;
        if device.family() != family {
            log::warn!(
                "Device {serial} is a {} device, request expects {family}",
                device.family()
            );
            return Err(Status::NotSupported);
        }
        Ok(device)
    }

    fn submit_report(
        &mut self,
        serial: u32,
        report: TargetReport,
        origin: &Origin,
    ) -> Result<Outcome, Status> {
        let device = self.lookup_family(serial, report.family(), origin)?;
        device.submit_report(report)?;
        Ok(Status::Success.into())
    }

    fn submit_interrupt(
        &mut self,
        input: &[u8],
        declared: usize,
        origin: &Origin,
    ) -> Result<Outcome, Status> {
        let request: XgipSubmitInterrupt = decode_targeted(input, declared)?;
        let Some(packet) = request.packet() else {
            log::warn!(
                "Invalid interrupt length {} for device {}",
                request.interrupt_length,
                request.serial_no
            );
            return Err(Status::InvalidParameter);
        };
        let device = self.lookup_family(request.serial_no, Family::Xgip, origin)?;
        device.submit_interrupt(packet)?;
        Ok(Status::Success.into())
    }

    fn request_notification<T>(
        &mut self,
        request: &IoRequest,
        family: Family,
        origin: &Origin,
    ) -> Result<Outcome, Status>
    where
        T: TargetedRequest,
    {
        if request.output_capacity < T::SIZE {
            return Err(Status::BufferTooSmall);
        }
        let notification: T = decode_targeted(&request.input, request.input_length)?;
        let device = self.lookup_family(notification.serial_no(), family, origin)?;
        Ok(device.request_notification(request.pending()))
    }

    fn get_user_index(&mut self, request: &IoRequest, origin: &Origin) -> Result<Outcome, Status> {
        if request.output_capacity < XusbGetUserIndex::SIZE {
            return Err(Status::BufferTooSmall);
        }
        let mut query: XusbGetUserIndex = decode_targeted(&request.input, request.input_length)?;
        let device = self.lookup_family(query.serial_no, Family::Xusb, origin)?;
        let Some(index) = device.user_index()? else {
            log::debug!("Device {} has no user index assigned", query.serial_no);
            return Err(Status::InvalidDeviceObjectParameter);
        };
        query.user_index = index as u32;
        let data = query.pack().map_err(|_| Status::InvalidParameter)?;
        Ok(Outcome::Immediate(Completion::success(data.to_vec())))
    }

    /// Handle a bulk or interrupt transfer from the consuming USB stack. IN
    /// transfers may be parked until the application submits a report.
    pub fn submit_transfer(
        &mut self,
        serial: u32,
        transfer: InterruptTransfer,
        request: PendingRequest,
    ) -> Outcome {
        let reply = request.clone();
        let outcome = match self.registry.lookup(serial) {
            Ok(device) => device
                .transfer(transfer, request)
                .unwrap_or_else(|e| {
                    log::debug!("Transfer on device {serial} failed: {e}");
                    Status::from(e).into()
                }),
            Err(e) => Status::from(e).into(),
        };
        if let Outcome::Immediate(completion) = &outcome {
            reply.complete(completion.clone());
        }
        outcome
    }

    /// Fill in the interfaces of the configuration the consumer selected
    pub fn select_configuration(
        &mut self,
        serial: u32,
        mut interfaces: Vec<InterfaceInformation>,
    ) -> Result<Vec<InterfaceInformation>, Status> {
        let device = self.registry.lookup(serial)?;
        device.select_configuration(&mut interfaces)?;
        Ok(interfaces)
    }

    pub fn get_descriptor(
        &mut self,
        serial: u32,
        descriptor_type: u8,
        index: u8,
        length: usize,
    ) -> Result<Vec<u8>, Status> {
        let device = self.registry.lookup(serial)?;
        Ok(device.get_descriptor(descriptor_type, index, length)?)
    }

    pub fn control_transfer(
        &mut self,
        serial: u32,
        setup: SetupPacket,
        data: &[u8],
    ) -> Result<Vec<u8>, Status> {
        let device = self.registry.lookup(serial)?;
        Ok(device.control_transfer(&setup, data)?)
    }

    /// Cancel the parked request with the given id. Returns true if the
    /// request was found and the origin may cancel it.
    pub fn cancel(&mut self, id: RequestId, origin: &Origin) -> bool {
        self.registry
            .devices_mut()
            .any(|device| device.cancel(id, origin))
    }

    /// Cancel every request the given origin has parked on a device it
    /// owns. Returns the number of cancelled requests.
    pub fn cancel_requests(&mut self, serial: u32, origin: &Origin) -> Result<usize, Status> {
        if serial == 0 {
            return Err(Status::InvalidParameter);
        }
        let device = self.registry.lookup_owned(serial, origin)?;
        let count = device.cancel_from(origin);
        log::debug!("Cancelled {count} request(s) on device {serial}");
        Ok(count)
    }

    /// Unplug every device owned by the given caller. Returns the number of
    /// removed devices.
    pub fn release_owner(&mut self, caller: &CallerId) -> usize {
        let removed = self.registry.release_owner(caller);
        let count = removed.len();
        if count > 0 {
            log::info!("Released {count} device(s) owned by {caller}");
        }
        self.push_removals(removed);
        count
    }

    /// Unplug every device. Returns the number of removed devices.
    pub fn shutdown(&mut self) -> usize {
        let removed = self.registry.clear();
        let count = removed.len();
        self.push_removals(removed);
        count
    }

    fn push_removals(&mut self, removed: Vec<(u32, usize)>) {
        for (serial, drained) in removed {
            self.events.push(BusEvent::ChildRemoved { serial, drained });
        }
    }

    /// Summaries of all live children ordered by serial
    pub fn children(&self) -> Vec<ChildSummary> {
        let mut children: Vec<ChildSummary> =
            self.registry.devices().map(|device| device.summary()).collect();
        children.sort_by_key(|child| child.serial);
        children
    }
}

//! Per-device rendezvous between the application and the consuming USB
//! stack. Both sides produce at their own pace: whichever side arrives
//! first either completes a parked request of the other side or leaves
//! its data buffered.
use crate::bus::{
    queue::RequestQueue,
    request::{Completion, Outcome, PendingRequest, RequestId},
    status::Status,
    Origin,
};

#[derive(Debug)]
pub struct DeviceChannel {
    /// IN transfers from the consumer waiting for a report
    pending_transfers: RequestQueue,
    /// Application requests waiting for a notification
    pending_notifications: RequestQueue,
    /// Transfers on pipes that never produce data
    held: RequestQueue,
    /// Most recent report not yet consumed by a transfer
    report: Option<Vec<u8>>,
    /// Most recent notification not yet consumed by a request
    notification: Option<Vec<u8>>,
}

impl Default for DeviceChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceChannel {
    pub fn new() -> Self {
        Self {
            pending_transfers: RequestQueue::new("transfer"),
            pending_notifications: RequestQueue::new("notification"),
            held: RequestQueue::new("holding"),
            report: None,
            notification: None,
        }
    }

    /// Deliver a report to the oldest waiting IN transfer, or buffer it if
    /// no transfer is waiting. Returns true if a transfer was completed.
    pub fn submit_report(&mut self, report: Vec<u8>) -> bool {
        if self.complete_pending_transfer(&report) {
            return true;
        }
        log::trace!("No pending transfer, buffering report");
        self.report = Some(report);
        false
    }

    /// Deliver data to the oldest waiting IN transfer without buffering it.
    /// Returns false if no live transfer was waiting.
    pub fn complete_pending_transfer(&mut self, data: &[u8]) -> bool {
        while let Some(request) = self.pending_transfers.pop_live() {
            log::trace!("Completing transfer {} with {data:02X?}", request.id);
            if request.complete(Completion::success(data.to_vec())) {
                return true;
            }
        }
        false
    }

    /// Complete the IN transfer with the buffered report if one is fresh,
    /// otherwise park it until the next report arrives.
    pub fn enqueue_pending_transfer(&mut self, request: PendingRequest) -> Outcome {
        if let Some(report) = self.report.take() {
            log::trace!("Completing transfer {} with buffered report", request.id);
            return Outcome::Immediate(Completion::success(report));
        }
        let id = request.id;
        self.pending_transfers.push(request);
        Outcome::Deferred(id)
    }

    /// Deliver a notification to the oldest waiting application request, or
    /// buffer it. Returns true if a request was completed.
    pub fn submit_notification(&mut self, notification: Vec<u8>) -> bool {
        while let Some(request) = self.pending_notifications.pop_live() {
            log::trace!("Completing notification request {}", request.id);
            if request.complete(Completion::success(notification.clone())) {
                return true;
            }
        }
        log::trace!("No pending notification request, buffering notification");
        self.notification = Some(notification);
        false
    }

    /// Complete the notification request with the buffered notification if
    /// one is fresh, otherwise park it.
    pub fn request_notification(&mut self, request: PendingRequest) -> Outcome {
        if let Some(notification) = self.notification.take() {
            log::trace!(
                "Completing notification request {} with buffered notification",
                request.id
            );
            return Outcome::Immediate(Completion::success(notification));
        }
        let id = request.id;
        self.pending_notifications.push(request);
        Outcome::Deferred(id)
    }

    /// Park a transfer that will only ever be completed by cancellation or
    /// removal.
    pub fn hold(&mut self, request: PendingRequest) -> Outcome {
        let id = request.id;
        self.held.push(request);
        Outcome::Deferred(id)
    }

    /// Cancel the parked request with the given id. Returns true if it was
    /// found in any queue and the origin may cancel it.
    pub fn cancel(&mut self, id: RequestId, origin: &Origin) -> bool {
        self.pending_transfers.cancel(id, origin)
            || self.pending_notifications.cancel(id, origin)
            || self.held.cancel(id, origin)
    }

    /// Cancel every parked request issued by the given origin
    pub fn cancel_from(&mut self, origin: &Origin) -> usize {
        self.pending_transfers.cancel_from(origin)
            + self.pending_notifications.cancel_from(origin)
            + self.held.cancel_from(origin)
    }

    /// Returns true if the given request is parked in this channel
    pub fn contains(&self, id: RequestId) -> bool {
        self.pending_transfers.contains(id)
            || self.pending_notifications.contains(id)
            || self.held.contains(id)
    }

    /// Complete every parked request with [Status::DeviceRemoved] and drop
    /// all buffered data. Returns the number of drained requests.
    pub fn drain(&mut self) -> usize {
        self.report = None;
        self.notification = None;
        self.pending_transfers.drain(Status::DeviceRemoved)
            + self.pending_notifications.drain(Status::DeviceRemoved)
            + self.held.drain(Status::DeviceRemoved)
    }

    pub fn pending_transfer_count(&self) -> usize {
        self.pending_transfers.len()
    }

    pub fn pending_notification_count(&self) -> usize {
        self.pending_notifications.len()
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Returns true if a report is buffered and not yet consumed
    pub fn has_fresh_report(&self) -> bool {
        self.report.is_some()
    }

    /// Returns true if a notification is buffered and not yet consumed
    pub fn has_fresh_notification(&self) -> bool {
        self.notification.is_some()
    }
}

use std::collections::VecDeque;

use crate::bus::{
    request::{Completion, PendingRequest, RequestId},
    status::Status,
    Origin,
};

/// FIFO of parked requests that are only dispatched when a matching
/// producer explicitly pops them.
#[derive(Debug, Default)]
pub struct RequestQueue {
    name: &'static str,
    entries: VecDeque<PendingRequest>,
}

impl RequestQueue {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: VecDeque::new(),
        }
    }

    /// Park the given request at the back of the queue
    pub fn push(&mut self, request: PendingRequest) {
        log::debug!("Parking request {} in {} queue", request.id, self.name);
        self.entries.push_back(request);
    }

    /// Pop the oldest request whose requester is still waiting. Abandoned
    /// requests found on the way are dropped.
    pub fn pop_live(&mut self) -> Option<PendingRequest> {
        while let Some(request) = self.entries.pop_front() {
            if request.is_abandoned() {
                log::debug!(
                    "Dropping abandoned request {} from {} queue",
                    request.id,
                    self.name
                );
                continue;
            }
            return Some(request);
        }
        None
    }

    /// Remove the request with the given id and complete it as cancelled.
    /// Returns true if the request was found and the origin may cancel it.
    pub fn cancel(&mut self, id: RequestId, origin: &Origin) -> bool {
        let Some(position) = self
            .entries
            .iter()
            .position(|r| r.id == id && r.is_cancellable_by(origin))
        else {
            return false;
        };
        let Some(request) = self.entries.remove(position) else {
            return false;
        };
        log::debug!("Cancelled request {id} in {} queue", self.name);
        request.complete(Completion::status(Status::Cancelled));
        true
    }

    /// Cancel every parked request issued by the given origin. Returns the
    /// number of requests that were still waiting.
    pub fn cancel_from(&mut self, origin: &Origin) -> usize {
        let (cancelled, kept) = self
            .entries
            .drain(..)
            .partition::<VecDeque<_>, _>(|r| &r.origin == origin);
        self.entries = kept;
        let count = cancelled
            .into_iter()
            .map(|r| r.complete(Completion::status(Status::Cancelled)))
            .filter(|completed| *completed)
            .count();
        if count > 0 {
            log::debug!("Cancelled {count} request(s) in {} queue", self.name);
        }
        count
    }

    /// Complete every parked request with the given status. Returns the
    /// number of requesters that received the completion.
    pub fn drain(&mut self, status: Status) -> usize {
        let count = self
            .entries
            .drain(..)
            .map(|r| r.complete(Completion::status(status)))
            .filter(|completed| *completed)
            .count();
        if count > 0 {
            log::debug!("Drained {count} request(s) from {} queue", self.name);
        }
        count
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use std::error::Error;

use tokio::sync::mpsc::Receiver;

use crate::bus::{
    channel::DeviceChannel,
    request::{Completer, Completion, Outcome, PendingRequest, RequestId},
    status::Status,
    Origin,
};

fn pending(id: u64, capacity: usize) -> (PendingRequest, Receiver<Completion>) {
    let (completer, rx) = Completer::channel();
    (PendingRequest::new(RequestId(id), capacity, completer), rx)
}

#[tokio::test]
async fn transfer_waits_for_report() -> Result<(), Box<dyn Error>> {
    let mut channel = DeviceChannel::new();
    let (request, mut rx) = pending(1, 32);

    let outcome = channel.enqueue_pending_transfer(request);
    assert_eq!(outcome, Outcome::Deferred(RequestId(1)));
    assert_eq!(channel.pending_transfer_count(), 1);

    assert!(channel.submit_report(vec![1, 2, 3]));
    let completion = rx.try_recv()?;
    assert_eq!(completion.status, Status::Success);
    assert_eq!(completion.data, vec![1, 2, 3]);
    assert_eq!(channel.pending_transfer_count(), 0);
    assert!(!channel.has_fresh_report());

    Ok(())
}

#[tokio::test]
async fn buffered_report_is_consumed_once() -> Result<(), Box<dyn Error>> {
    let mut channel = DeviceChannel::new();
    assert!(!channel.submit_report(vec![0xAA]));
    assert!(!channel.submit_report(vec![0xBB]));
    assert!(channel.has_fresh_report());

    // Only the latest report is kept
    let (request, _rx) = pending(1, 32);
    let outcome = channel.enqueue_pending_transfer(request);
    assert_eq!(outcome, Outcome::Immediate(Completion::success(vec![0xBB])));

    // Nothing fresh is left, so the next transfer parks
    let (request, _rx) = pending(2, 32);
    assert!(channel.enqueue_pending_transfer(request).is_deferred());

    Ok(())
}

#[tokio::test]
async fn report_skips_departed_requesters() -> Result<(), Box<dyn Error>> {
    let mut channel = DeviceChannel::new();
    let (gone, gone_rx) = pending(1, 32);
    let (waiting, mut waiting_rx) = pending(2, 32);
    channel.enqueue_pending_transfer(gone);
    channel.enqueue_pending_transfer(waiting);
    drop(gone_rx);

    assert!(channel.submit_report(vec![7]));
    assert_eq!(waiting_rx.try_recv()?.data, vec![7]);
    assert!(!channel.has_fresh_report());

    Ok(())
}

#[tokio::test]
async fn completion_is_truncated_to_capacity() -> Result<(), Box<dyn Error>> {
    let mut channel = DeviceChannel::new();
    let (request, mut rx) = pending(1, 2);
    channel.request_notification(request);

    assert!(channel.submit_notification(vec![1, 2, 3, 4]));
    let completion = rx.try_recv()?;
    assert_eq!(completion.data, vec![1, 2]);

    Ok(())
}

#[tokio::test]
async fn notifications_are_fifo() -> Result<(), Box<dyn Error>> {
    let mut channel = DeviceChannel::new();
    let (first, mut rx1) = pending(1, 8);
    let (second, mut rx2) = pending(2, 8);
    channel.request_notification(first);
    channel.request_notification(second);
    assert_eq!(channel.pending_notification_count(), 2);

    channel.submit_notification(vec![1]);
    assert_eq!(rx1.try_recv()?.data, vec![1]);
    assert!(rx2.try_recv().is_err());

    channel.submit_notification(vec![2]);
    assert_eq!(rx2.try_recv()?.data, vec![2]);

    Ok(())
}

#[tokio::test]
async fn cancel_and_drain() -> Result<(), Box<dyn Error>> {
    let mut channel = DeviceChannel::new();
    let (transfer, mut transfer_rx) = pending(1, 8);
    let (notification, mut notification_rx) = pending(2, 8);
    let (held, mut held_rx) = pending(3, 8);
    channel.enqueue_pending_transfer(transfer);
    channel.request_notification(notification);
    channel.hold(held);
    assert!(channel.contains(RequestId(3)));

    assert!(channel.cancel(RequestId(1), &Origin::Internal));
    assert!(!channel.cancel(RequestId(1), &Origin::Internal));
    assert_eq!(transfer_rx.try_recv()?.status, Status::Cancelled);

    channel.submit_report(vec![1]);
    assert_eq!(channel.drain(), 2);
    assert_eq!(notification_rx.try_recv()?.status, Status::DeviceRemoved);
    assert_eq!(held_rx.try_recv()?.status, Status::DeviceRemoved);
    assert!(!channel.has_fresh_report());
    assert_eq!(channel.held_count(), 0);

    Ok(())
}

//! Transmit queue with per-frame lifecycle tracking.
//!
//! Every outbound frame is tracked from `Pending` through `Sent` to a
//! terminal `Acked` or `Errored` state, correlated with the radio's routing
//! response by packet id. Each entry carries exactly one waiter that is
//! released when the entry reaches a terminal state.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use bytes::Bytes;
use tokio::sync::{oneshot, Mutex};

use crate::error::{Error, Result};
use crate::proto;
use crate::protocol::frame::MAX_FRAME_SIZE;
use crate::transport::Transport;

/// Lifecycle state of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    /// Waiting for a drain to pick it up.
    Pending,
    /// Written to the transport, awaiting the radio's routing response.
    Sent,
}

struct QueueEntry {
    id: u32,
    data: Bytes,
    state: EntryState,
    waiter: Option<oneshot::Sender<Result<u32>>>,
}

/// Handle for one queued frame; resolves when the radio acknowledges or
/// rejects it, or when the queue is cleared.
pub struct SendHandle {
    id: u32,
    rx: oneshot::Receiver<Result<u32>>,
}

impl SendHandle {
    /// The packet id assigned to this send.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Waits for the entry to reach a terminal state.
    ///
    /// Resolves with the packet id on acknowledgement. No timeout is
    /// applied here; callers race this against their own timer if desired.
    pub async fn wait_ack(self) -> Result<u32> {
        self.rx.await.map_err(|_| Error::Cancelled)?
    }
}

/// FIFO transmit queue; the exclusive writer to the transport.
///
/// Entries are written in insertion order, one frame in flight at a time.
/// Concurrent [`drain`](TxQueue::drain) calls share a single in-flight
/// slot.
#[derive(Clone, Default)]
pub struct TxQueue {
    entries: Arc<StdMutex<VecDeque<QueueEntry>>>,
    // Serializes drains so only one frame is in flight at a time.
    write_slot: Arc<Mutex<()>>,
}

impl TxQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a frame in the queue in `Pending` state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload exceeds the
    /// 512-byte frame limit. Nothing is queued in that case.
    pub fn enqueue(&self, id: u32, data: Bytes) -> Result<SendHandle> {
        if data.len() > MAX_FRAME_SIZE {
            return Err(Error::PayloadTooLarge {
                size: data.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        let (tx, rx) = oneshot::channel();

        let mut entries = self.entries.lock().expect("queue lock poisoned");
        // Ids are CSPRNG-drawn so collisions are structural, not expected;
        // release the stale entry to keep one entry per id.
        if let Some(pos) = entries.iter().position(|e| e.id == id) {
            let mut stale = entries.remove(pos).expect("position just found");
            if let Some(waiter) = stale.waiter.take() {
                let _ = waiter.send(Err(Error::Cancelled));
            }
        }
        entries.push_back(QueueEntry {
            id,
            data,
            state: EntryState::Pending,
            waiter: Some(tx),
        });

        tracing::trace!("queued frame id={id} ({} total)", entries.len());
        Ok(SendHandle { id, rx })
    }

    /// Writes as many `Pending` entries as the transport will accept, one
    /// at a time, transitioning each to `Sent`.
    ///
    /// # Errors
    ///
    /// A transport write failure marks the just-sent entry `Errored`
    /// (releasing its waiter with a transport error) and is also returned
    /// to the caller. No automatic retransmission happens here.
    pub async fn drain<T: Transport>(&self, transport: &Mutex<T>) -> Result<()> {
        // Concurrent drains queue up behind the single in-flight slot.
        let _slot = self.write_slot.lock().await;

        loop {
            let next = {
                let mut entries = self.entries.lock().expect("queue lock poisoned");
                entries
                    .iter_mut()
                    .find(|e| e.state == EntryState::Pending)
                    .map(|entry| {
                        entry.state = EntryState::Sent;
                        (entry.id, entry.data.clone())
                    })
            };

            let Some((id, data)) = next else {
                return Ok(());
            };

            let write_result = {
                let mut transport = transport.lock().await;
                transport.write(data).await
            };

            match write_result {
                Ok(()) => {
                    tracing::trace!("wrote frame id={id}");
                }
                Err(e) => {
                    tracing::warn!("transport write failed for id={id}: {e}");
                    self.fail_entry(id, &e.to_string());
                    return Err(e);
                }
            }
        }
    }

    /// Transitions the entry with the given id to `Acked`, resolving its
    /// waiter with the id. Unknown ids are ignored.
    pub fn process_ack(&self, request_id: u32) {
        let mut entries = self.entries.lock().expect("queue lock poisoned");
        if let Some(pos) = entries.iter().position(|e| e.id == request_id) {
            let mut entry = entries.remove(pos).expect("position just found");
            if let Some(waiter) = entry.waiter.take() {
                let _ = waiter.send(Ok(request_id));
            }
            tracing::trace!("frame id={request_id} acked");
        }
    }

    /// Transitions the entry with the given id to `Errored`, resolving its
    /// waiter with the routing failure. Unknown ids are ignored.
    pub fn process_error(&self, request_id: u32, reason: proto::routing::Error) {
        let mut entries = self.entries.lock().expect("queue lock poisoned");
        if let Some(pos) = entries.iter().position(|e| e.id == request_id) {
            let mut entry = entries.remove(pos).expect("position just found");
            if let Some(waiter) = entry.waiter.take() {
                let _ = waiter.send(Err(Error::Routing { reason }));
            }
            tracing::debug!("frame id={request_id} errored: {reason:?}");
        }
    }

    /// Drops all non-terminal entries, releasing their waiters with a
    /// cancellation error.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("queue lock poisoned");
        for mut entry in entries.drain(..) {
            if let Some(waiter) = entry.waiter.take() {
                let _ = waiter.send(Err(Error::Cancelled));
            }
        }
    }

    /// Number of entries awaiting a terminal state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("queue lock poisoned").len()
    }

    /// Returns true if no entries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fail_entry(&self, id: u32, message: &str) {
        let mut entries = self.entries.lock().expect("queue lock poisoned");
        if let Some(pos) = entries.iter().position(|e| e.id == id) {
            let mut entry = entries.remove(pos).expect("position just found");
            if let Some(waiter) = entry.waiter.take() {
                let _ = waiter.send(Err(Error::Transport {
                    message: message.to_owned(),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ack_resolves_waiter_with_id() {
        let queue = TxQueue::new();
        let handle = queue.enqueue(42, Bytes::from_static(b"data")).unwrap();

        queue.process_ack(42);

        assert_eq!(handle.wait_ack().await.unwrap(), 42);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_ack_unknown_id_is_noop() {
        let queue = TxQueue::new();
        let handle = queue.enqueue(1, Bytes::from_static(b"data")).unwrap();

        queue.process_ack(999);
        assert_eq!(queue.len(), 1);

        // The original entry is still resolvable.
        queue.process_ack(1);
        assert_eq!(handle.wait_ack().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_error_resolves_waiter_with_reason() {
        let queue = TxQueue::new();
        let handle = queue.enqueue(7, Bytes::from_static(b"data")).unwrap();

        queue.process_error(7, proto::routing::Error::Timeout);

        match handle.wait_ack().await {
            Err(Error::Routing { reason }) => {
                assert_eq!(reason, proto::routing::Error::Timeout);
            }
            other => panic!("expected routing error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oversize_payload_rejected() {
        let queue = TxQueue::new();
        let data = Bytes::from(vec![0u8; 600]);

        match queue.enqueue(1, data) {
            Err(Error::PayloadTooLarge { size: 600, max: 512 }) => {}
            other => panic!("expected PayloadTooLarge, got {:?}", other.map(|h| h.id())),
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_clear_cancels_waiters() {
        let queue = TxQueue::new();
        let a = queue.enqueue(1, Bytes::from_static(b"a")).unwrap();
        let b = queue.enqueue(2, Bytes::from_static(b"b")).unwrap();

        queue.clear();

        assert!(matches!(a.wait_ack().await, Err(Error::Cancelled)));
        assert!(matches!(b.wait_ack().await, Err(Error::Cancelled)));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_releases_stale_entry() {
        let queue = TxQueue::new();
        let old = queue.enqueue(5, Bytes::from_static(b"old")).unwrap();
        let new = queue.enqueue(5, Bytes::from_static(b"new")).unwrap();

        assert!(matches!(old.wait_ack().await, Err(Error::Cancelled)));
        assert_eq!(queue.len(), 1);

        queue.process_ack(5);
        assert_eq!(new.wait_ack().await.unwrap(), 5);
    }
}

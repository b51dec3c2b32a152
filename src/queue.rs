//! The asynchronous-operation wait queue: FIFO pending reads with per-entry deadlines.

use crate::error::AsyncStatus;
use std::{
    collections::VecDeque,
    fmt::{self, Debug, Formatter},
    time::Instant,
};

/// Identifies the client on whose behalf an asynchronous request was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(pub u32);

/// Operation type tag carried by asynchronous I/O requests. A mailslot only services
/// [`Read`](AsyncType::Read).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsyncType {
    /// Transfer data out of the object.
    Read,
    /// Transfer data into the object.
    Write,
    /// Wait for an object-specific condition.
    Wait,
}

type CompleteFn = Box<dyn FnOnce(AsyncStatus)>;

/// One pending read parked in a mailslot's wait queue.
pub struct PendingRead {
    requester: ClientId,
    deadline: Option<Instant>,
    complete: CompleteFn,
}

impl PendingRead {
    /// The client that issued the request.
    pub fn requester(&self) -> ClientId {
        self.requester
    }
    /// Absolute expiry point, captured from the slot's read timeout at enqueue time. `None`
    /// waits indefinitely.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
impl Debug for PendingRead {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRead")
            .field("requester", &self.requester)
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// A queue entry taken off the queue together with its terminal status.
///
/// Delivery is a separate step so the queue's owner can release its own borrows before the
/// completion callback runs; callbacks are free to call back into the owning object.
#[must_use = "a resolution does nothing until delivered"]
pub struct Resolution {
    request: PendingRead,
    status: AsyncStatus,
}

impl Resolution {
    /// The status this entry resolved with.
    pub fn status(&self) -> AsyncStatus {
        self.status
    }
    /// The client whose request resolved.
    pub fn requester(&self) -> ClientId {
        self.request.requester
    }
    /// Runs the completion callback with the terminal status.
    pub fn deliver(self) {
        tracing::trace!(requester = self.request.requester.0, status = %self.status, "read resolved");
        (self.request.complete)(self.status);
    }
}

/// FIFO queue of pending asynchronous reads.
///
/// Entries resolve exactly once: through [`terminate_head`](Self::terminate_head) on a
/// readiness event, through [`expire`](Self::expire) on deadline passage, or through
/// [`terminate_all`](Self::terminate_all) on cancellation or teardown.
#[derive(Default)]
pub struct WaitQueue {
    entries: VecDeque<PendingRead>,
}

impl WaitQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }
    /// Whether no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// The number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Parks a request at the tail.
    pub fn enqueue(
        &mut self,
        requester: ClientId,
        deadline: Option<Instant>,
        complete: impl FnOnce(AsyncStatus) + 'static,
    ) {
        self.entries.push_back(PendingRead { requester, deadline, complete: Box::new(complete) });
    }

    /// Takes the head entry off the queue, resolved with `status`. `None` when empty.
    pub fn terminate_head(&mut self, status: AsyncStatus) -> Option<Resolution> {
        self.entries.pop_front().map(|request| Resolution { request, status })
    }

    /// Empties the queue, resolving every entry with `status` in enqueue order.
    pub fn terminate_all(&mut self, status: AsyncStatus) -> Vec<Resolution> {
        self.entries.drain(..).map(|request| Resolution { request, status }).collect()
    }

    /// Removes every entry whose deadline has passed by `now`, resolved with
    /// [`AsyncStatus::IoTimeout`]. Unexpired entries keep their relative order.
    pub fn expire(&mut self, now: Instant) -> Vec<Resolution> {
        let mut expired = Vec::new();
        let mut kept = VecDeque::with_capacity(self.entries.len());
        for request in self.entries.drain(..) {
            match request.deadline {
                Some(deadline) if deadline <= now => {
                    expired.push(Resolution { request, status: AsyncStatus::IoTimeout });
                }
                _ => kept.push_back(request),
            }
        }
        self.entries = kept;
        expired
    }

    /// The earliest deadline among pending entries, for the event loop's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().filter_map(PendingRead::deadline).min()
    }
}

impl Debug for WaitQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue").field("entries", &self.entries).finish()
    }
}

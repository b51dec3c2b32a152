//! The mailslot entity: named-object lifecycle, the read-wait queue driving logic and the
//! info/query surface.

use crate::{
    error::{AsyncStatus, SlotError},
    name::SlotName,
    namespace::Namespace,
    os::unix::{dgram_pair, DgramSocket},
    queue::{AsyncType, ClientId, WaitQueue},
    writer::MailWriter,
};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt::{self, Debug, Formatter},
    io,
    os::fd::{AsFd, BorrowedFd},
    rc::{Rc, Weak},
    time::{Duration, Instant},
};

/// Millisecond sentinel meaning "wait forever" in the wire encoding of a read timeout.
const WAIT_FOREVER_MILLIS: u32 = u32::MAX;

/// How long a queued read may wait before it resolves with [`AsyncStatus::IoTimeout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadTimeout {
    /// Queued reads wait indefinitely for a readiness event.
    Forever,
    /// Queued reads expire this long after they were enqueued.
    After(Duration),
}

impl ReadTimeout {
    /// Decodes the wire encoding: milliseconds, with `0xFFFF_FFFF` meaning "wait forever".
    pub fn from_millis(ms: u32) -> Self {
        match ms {
            WAIT_FOREVER_MILLIS => Self::Forever,
            ms => Self::After(Duration::from_millis(ms.into())),
        }
    }
    /// Encodes back into milliseconds, clamping below the "wait forever" sentinel.
    pub fn to_millis(self) -> u32 {
        match self {
            Self::Forever => WAIT_FOREVER_MILLIS,
            Self::After(d) => d.as_millis().try_into().unwrap_or(WAIT_FOREVER_MILLIS - 1),
        }
    }
}

/// Readiness interest the event dispatcher should hold for a mailslot's read endpoint.
///
/// Interest is asserted exactly while reads are pending: a buffered message with nobody
/// waiting for it is not an event the mailslot cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interest {
    /// No reads are pending; readiness events are of no use.
    Idle,
    /// At least one read is pending; watch the read endpoint for readability.
    Readable,
}

/// Snapshot reported by [`Mailslot::info`] and [`Mailslot::set_info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MailslotInfo {
    /// Advisory maximum message size, fixed at creation. Not enforced by the transport.
    pub max_msgsize: u32,
    /// The timeout applied to reads enqueued from now on.
    pub read_timeout: ReadTimeout,
    /// 1 when at least one message is buffered, 0 otherwise. A probe, not a depth count.
    pub msg_count: u32,
    /// Byte size of the next buffered message, `None` when nothing is buffered.
    pub next_msgsize: Option<u32>,
}

/// A named, single-reader/multi-writer datagram channel.
///
/// The mailslot owns both endpoints of its transport pair: the read endpoint, which only the
/// creator ever consumes from, and the write endpoint, which every admitted [`MailWriter`]
/// sends through. Construction is atomic: a transport allocation failure destroys the
/// half-built object before it ever becomes visible in the namespace. Destruction cancels
/// every queued read before the endpoints close.
pub struct Mailslot {
    name: SlotName,
    max_msgsize: u32,
    read_timeout: Cell<ReadTimeout>,
    /// Read endpoint; what the readiness dispatcher watches.
    fd: DgramSocket,
    /// Write endpoint, shared with every attached writer.
    write_fd: DgramSocket,
    /// Attached writers, most recently admitted first. Back-references only: writers own
    /// the mailslot, not the other way around.
    writers: RefCell<Vec<Weak<MailWriter>>>,
    read_q: RefCell<WaitQueue>,
}

impl Mailslot {
    /// Creates a mailslot and registers it under `name`.
    ///
    /// The name must carry the reserved `mailslot\` prefix (case-insensitive) with at least
    /// one character after it, else [`SlotError::NameInvalid`]. A live mailslot already
    /// holding the name yields [`SlotError::NameCollision`] and leaves it untouched; a
    /// foreign object kind holding it yields [`SlotError::TypeMismatch`]. Transport
    /// allocation failures surface as [`SlotError::Io`] with nothing registered.
    pub fn create(
        ns: &dyn Namespace,
        name: &str,
        max_msgsize: u32,
        read_timeout: ReadTimeout,
    ) -> Result<Rc<Self>, SlotError> {
        let name = SlotName::new(name)?;
        let mut make = || -> io::Result<Rc<dyn Any>> {
            let (fd, write_fd) = dgram_pair()?;
            Ok(Rc::new(Self {
                name: name.clone(),
                max_msgsize,
                read_timeout: Cell::new(read_timeout),
                fd,
                write_fd,
                writers: RefCell::new(Vec::new()),
                read_q: RefCell::new(WaitQueue::new()),
            }) as Rc<dyn Any>)
        };
        let (object, is_new) = ns.create_named(&name, &mut make)?;
        let slot = object.downcast::<Self>().map_err(|_| SlotError::TypeMismatch)?;
        if !is_new {
            return Err(SlotError::NameCollision);
        }
        tracing::debug!(name = %slot.name, max_msgsize, "mailslot created");
        Ok(slot)
    }

    /// The slot's registered name.
    pub fn name(&self) -> &SlotName {
        &self.name
    }
    /// Advisory maximum message size, fixed at creation.
    pub fn max_msgsize(&self) -> u32 {
        self.max_msgsize
    }
    /// The timeout currently applied to newly enqueued reads.
    pub fn read_timeout(&self) -> ReadTimeout {
        self.read_timeout.get()
    }

    /// Whether at least one message is buffered, as a 0-or-1 count.
    pub fn message_count(&self) -> u32 {
        u32::from(self.fd.readable())
    }

    /// Byte size of the next buffered message, observed without consuming it. `None` when
    /// nothing is buffered (or the peek fails).
    pub fn next_msgsize(&self) -> Option<u32> {
        self.fd.peek_msgsize().ok().and_then(|size| size.try_into().ok())
    }

    /// Queues an asynchronous read against the slot and returns the readiness interest the
    /// dispatcher should hold afterwards.
    ///
    /// Rejects non-read operation types with [`SlotError::InvalidParameter`]. Fast-rejects
    /// with [`SlotError::IoTimeout`], creating no queue entry, when no writer is attached
    /// or no message is currently buffered: a read never waits for a message that does not
    /// yet exist, only out a race against other readers for one that does. Otherwise the
    /// entry is parked with a deadline derived from the current read timeout, and the
    /// endpoint is re-probed at once so a message that survived the enqueue window resolves
    /// the queue head immediately with [`AsyncStatus::Alerted`].
    pub fn queue_read(
        &self,
        ty: AsyncType,
        requester: ClientId,
        complete: impl FnOnce(AsyncStatus) + 'static,
    ) -> Result<Interest, SlotError> {
        if ty != AsyncType::Read {
            return Err(SlotError::InvalidParameter);
        }
        if !self.has_writers() || self.message_count() == 0 {
            return Err(SlotError::IoTimeout);
        }
        let deadline = match self.read_timeout.get() {
            ReadTimeout::Forever => None,
            // An expiry beyond the reach of the monotonic clock is as good as forever.
            ReadTimeout::After(timeout) => Instant::now().checked_add(timeout),
        };
        self.read_q.borrow_mut().enqueue(requester, deadline, complete);
        tracing::trace!(name = %self.name, requester = requester.0, "read queued");
        if self.message_count() != 0 {
            return Ok(self.on_readable());
        }
        Ok(self.poll_interest())
    }

    /// Handles a readable-readiness event: resolves exactly the queue head with
    /// [`AsyncStatus::Alerted`] and returns the recomputed interest. One event satisfies at
    /// most one pending read; the rest stay queued for the next event or their deadlines.
    pub fn on_readable(&self) -> Interest {
        let resolution = self.read_q.borrow_mut().terminate_head(AsyncStatus::Alerted);
        if let Some(resolution) = resolution {
            resolution.deliver();
        }
        self.poll_interest()
    }

    /// Resolves every pending read whose deadline has passed by `now` with
    /// [`AsyncStatus::IoTimeout`] and returns the recomputed interest. Entries behind an
    /// expired one keep their queue positions.
    pub fn expire_reads(&self, now: Instant) -> Interest {
        let expired = self.read_q.borrow_mut().expire(now);
        for resolution in expired {
            resolution.deliver();
        }
        self.poll_interest()
    }

    /// Cancels every pending read with [`AsyncStatus::Cancelled`], in enqueue order.
    pub fn cancel_reads(&self) {
        let cancelled = self.read_q.borrow_mut().terminate_all(AsyncStatus::Cancelled);
        if !cancelled.is_empty() {
            tracing::debug!(name = %self.name, count = cancelled.len(), "pending reads cancelled");
        }
        for resolution in cancelled {
            resolution.deliver();
        }
    }

    /// The interest the readiness dispatcher should currently hold: asserted while reads are
    /// pending, withdrawn when the queue is empty.
    pub fn poll_interest(&self) -> Interest {
        if self.read_q.borrow().is_empty() {
            Interest::Idle
        } else {
            Interest::Readable
        }
    }

    /// The earliest pending-read deadline, for the event loop's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.read_q.borrow().next_deadline()
    }

    /// Reports the slot's current state, optionally overwriting the read timeout first.
    ///
    /// The update only affects deadlines captured by subsequent enqueues; entries already
    /// queued keep theirs. The probes never consume buffered messages.
    pub fn set_info(&self, read_timeout: Option<ReadTimeout>) -> MailslotInfo {
        if let Some(timeout) = read_timeout {
            self.read_timeout.set(timeout);
        }
        self.info()
    }

    /// Reports the slot's current state without mutating anything.
    pub fn info(&self) -> MailslotInfo {
        MailslotInfo {
            max_msgsize: self.max_msgsize,
            read_timeout: self.read_timeout.get(),
            msg_count: self.message_count(),
            next_msgsize: self.next_msgsize(),
        }
    }

    /// Pulls the next buffered message out of the read endpoint; what the requester does
    /// after its read resolves with [`AsyncStatus::Alerted`]. Nonblocking:
    /// [`WouldBlock`](io::ErrorKind::WouldBlock) when another reader got there first.
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.fd.recv(buf)
    }

    fn has_writers(&self) -> bool {
        !self.writers.borrow().is_empty()
    }

    pub(crate) fn write_endpoint(&self) -> &DgramSocket {
        &self.write_fd
    }
    pub(crate) fn head_writer(&self) -> Option<Rc<MailWriter>> {
        self.writers.borrow().first().and_then(Weak::upgrade)
    }
    pub(crate) fn link_writer(&self, writer: &Rc<MailWriter>) {
        self.writers.borrow_mut().insert(0, Rc::downgrade(writer));
    }
    pub(crate) fn unlink_writer(&self, writer: *const MailWriter) {
        self.writers.borrow_mut().retain(|w| !std::ptr::eq(w.as_ptr(), writer));
    }

    #[cfg(test)]
    pub(crate) fn read_q(&self) -> &RefCell<WaitQueue> {
        &self.read_q
    }
}

impl AsFd for Mailslot {
    /// The read endpoint, for readiness-dispatcher registration.
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl Debug for Mailslot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailslot")
            .field("name", &self.name)
            .field("max_msgsize", &self.max_msgsize)
            .field("read_timeout", &self.read_timeout.get())
            .field("writers", &self.writers.borrow().len())
            .field("pending_reads", &self.read_q.borrow().len())
            .finish()
    }
}

impl Drop for Mailslot {
    /// Cancels the whole wait queue before the transport endpoints close, so no completion
    /// target outlives the slot.
    fn drop(&mut self) {
        tracing::debug!(name = %self.name, "mailslot destroyed");
        self.cancel_reads();
    }
}

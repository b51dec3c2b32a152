//! The error and completion-status taxonomy of the mailslot core.

use std::{
    fmt::{self, Display, Formatter},
    io,
};

/// Errors produced by mailslot request handling.
///
/// Every variant is resolved synchronously at the point of detection and returned to the
/// immediate caller; nothing is retried by the core.
#[derive(Debug)]
pub enum SlotError {
    /// A create-time name without the reserved `mailslot\` prefix, or with nothing after it.
    NameInvalid,
    /// Create on a name that already carries a live mailslot. The existing object is left
    /// untouched; this is "cannot create", not an alias.
    NameCollision,
    /// Open on a name with no registered object.
    NotFound,
    /// The name resolves to an object of a different kind.
    TypeMismatch,
    /// Open without share-read, or writer admission conflicting with the sharing policy.
    SharingViolation,
    /// Asynchronous request of an operation type the mailslot does not support.
    InvalidParameter,
    /// Fast-reject of a read: no writer attached, or no message buffered at enqueue time.
    IoTimeout,
    /// Transport-level failure, carrying the OS's own error mapping.
    Io(io::Error),
}

impl SlotError {
    const fn msg(&self) -> &'static str {
        use SlotError::*;
        match self {
            NameInvalid => "invalid mailslot name",
            NameCollision => "a mailslot with this name already exists",
            NotFound => "no object is registered under this name",
            TypeMismatch => "the name does not refer to a mailslot",
            SharingViolation => "sharing mode conflicts with an attached writer",
            InvalidParameter => "unsupported operation type",
            IoTimeout => "no message is available to read",
            Io(_) => "transport error",
        }
    }
    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::NameInvalid | Self::TypeMismatch | Self::InvalidParameter => {
                io::ErrorKind::InvalidInput
            }
            Self::NameCollision => io::ErrorKind::AlreadyExists,
            Self::NotFound => io::ErrorKind::NotFound,
            Self::SharingViolation => io::ErrorKind::PermissionDenied,
            Self::IoTimeout => io::ErrorKind::TimedOut,
            Self::Io(e) => e.kind(),
        }
    }
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{}: {e}", self.msg()),
            _ => f.write_str(self.msg()),
        }
    }
}
impl std::error::Error for SlotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl From<io::Error> for SlotError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
impl From<SlotError> for io::Error {
    fn from(e: SlotError) -> Self {
        match e {
            SlotError::Io(inner) => inner,
            other => io::Error::new(other.io_kind(), other.msg()),
        }
    }
}

/// Terminal status delivered to a queued read, exactly once per entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsyncStatus {
    /// The read endpoint became readable; the requester should now pull the message.
    Alerted,
    /// The entry's deadline expired before a readiness event reached it.
    IoTimeout,
    /// The queue was explicitly cancelled or torn down with the mailslot.
    Cancelled,
}

impl Display for AsyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Alerted => "alerted",
            Self::IoTimeout => "timed out",
            Self::Cancelled => "cancelled",
        })
    }
}

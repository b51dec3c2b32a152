//! Writer attachment: access/sharing masks, the admission policy and the writer entity.

use crate::{error::SlotError, mailslot::Mailslot, namespace::Namespace};
use bitflags::bitflags;
use std::{
    fmt::{self, Debug, Formatter},
    io,
    os::fd::{AsFd, BorrowedFd},
    rc::Rc,
};

bitflags! {
    /// Requested access mask, in the Windows encoding.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Access: u32 {
        /// Read access to the slot's metadata.
        const GENERIC_READ = 0x8000_0000;
        /// Write access: the holder intends to post messages.
        const GENERIC_WRITE = 0x4000_0000;
    }
}

bitflags! {
    /// Requested sharing mask, in the Windows encoding.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Sharing: u32 {
        /// Other handles may read while this one is open. Mandatory for mailslots.
        const READ = 0x0000_0001;
        /// Other handles may write while this one is open.
        const WRITE = 0x0000_0002;
    }
}

/// One writer's attachment to a mailslot.
///
/// A writer holds a strong reference to its slot, so the slot outlives every attachment;
/// dropping the writer unlinks it from the slot's writers list and may in turn destroy the
/// slot if that reference was the last one.
pub struct MailWriter {
    mailslot: Rc<Mailslot>,
    access: Access,
    sharing: Sharing,
}

impl MailWriter {
    /// Resolves `name` and attaches a new writer with the given access and sharing modes.
    ///
    /// Share-read is mandatory and checked before the lookup: omitting it fails with
    /// [`SlotError::SharingViolation`] even when no such slot exists. Readers and writers
    /// cannot otherwise be mixed: when write access is involved on either side, both this
    /// request and the already-attached representative must grant share-write. Only the most
    /// recently admitted writer is consulted, not the full set.
    pub fn open(
        ns: &dyn Namespace,
        name: &str,
        access: Access,
        sharing: Sharing,
    ) -> Result<Rc<Self>, SlotError> {
        if !sharing.contains(Sharing::READ) {
            return Err(SlotError::SharingViolation);
        }
        let object = ns.find_named(name).ok_or(SlotError::NotFound)?;
        let mailslot = object.downcast::<Mailslot>().map_err(|_| SlotError::TypeMismatch)?;
        if let Some(head) = mailslot.head_writer() {
            let write_involved = access.contains(Access::GENERIC_WRITE)
                || head.access.contains(Access::GENERIC_WRITE);
            let both_share_write =
                sharing.contains(Sharing::WRITE) && head.sharing.contains(Sharing::WRITE);
            if write_involved && !both_share_write {
                tracing::debug!(name = %mailslot.name(), ?access, ?sharing, "writer admission rejected");
                return Err(SlotError::SharingViolation);
            }
        }
        let writer = Rc::new(Self { mailslot, access, sharing });
        writer.mailslot.link_writer(&writer);
        tracing::debug!(name = %writer.mailslot.name(), ?access, ?sharing, "writer attached");
        Ok(writer)
    }

    /// Posts one datagram through the slot's shared write endpoint. Fire-and-forget: there
    /// is no queuing and no completion to wait for; failure surfaces right here, with
    /// [`WouldBlock`](io::ErrorKind::WouldBlock) when the transport buffer is full.
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.mailslot.write_endpoint().send(buf)
    }

    /// The mailslot this writer is attached to.
    pub fn mailslot(&self) -> &Rc<Mailslot> {
        &self.mailslot
    }
    /// The access mask this writer was admitted with.
    pub fn access(&self) -> Access {
        self.access
    }
    /// The sharing mask this writer was admitted with.
    pub fn sharing(&self) -> Sharing {
        self.sharing
    }
}

impl AsFd for MailWriter {
    /// The shared write endpoint; the descriptor handed out to writer clients.
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.mailslot.write_endpoint().as_fd()
    }
}

impl Debug for MailWriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailWriter")
            .field("mailslot", &self.mailslot.name())
            .field("access", &self.access)
            .field("sharing", &self.sharing)
            .finish()
    }
}

impl Drop for MailWriter {
    fn drop(&mut self) {
        // Unlink before the strong reference to the mailslot is released.
        self.mailslot.unlink_writer(self);
    }
}

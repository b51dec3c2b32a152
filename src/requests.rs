//! The protocol surface: the request/reply shapes accepted from the outer dispatch loop and
//! the handlers that service them.

use crate::{
    error::SlotError,
    mailslot::{Mailslot, MailslotInfo, ReadTimeout},
    namespace::Namespace,
    writer::{Access, MailWriter, Sharing},
};
use std::rc::Rc;

/// A handle entry the way the external handle table records one: the object, the granted
/// access mask and the inheritable flag.
#[derive(Debug)]
pub struct SlotHandle<T> {
    object: Rc<T>,
    access: Access,
    inherit: bool,
}

impl<T> SlotHandle<T> {
    fn new(object: Rc<T>, access: Access, inherit: bool) -> Self {
        Self { object, access, inherit }
    }
    /// The object the handle refers to.
    pub fn object(&self) -> &Rc<T> {
        &self.object
    }
    /// The access mask the handle was granted.
    pub fn access(&self) -> Access {
        self.access
    }
    /// Whether child processes inherit the handle.
    pub fn inheritable(&self) -> bool {
        self.inherit
    }
}

/// Parameters of a create request.
#[derive(Clone, Copy, Debug)]
pub struct CreateMailslotRequest<'a> {
    /// Namespaced slot name; must carry the reserved `mailslot\` prefix.
    pub name: &'a str,
    /// Advisory maximum message size.
    pub max_msgsize: u32,
    /// Initial read timeout.
    pub read_timeout: ReadTimeout,
    /// Whether the returned handle is inheritable.
    pub inherit: bool,
}

/// Parameters of an open request.
#[derive(Clone, Copy, Debug)]
pub struct OpenMailslotRequest<'a> {
    /// Namespaced slot name to resolve.
    pub name: &'a str,
    /// Requested access mask.
    pub access: Access,
    /// Requested sharing mask; must include share-read.
    pub sharing: Sharing,
    /// Whether the returned handle is inheritable.
    pub inherit: bool,
}

/// Parameters of a set-info request. `None` leaves the read timeout unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct SetMailslotInfoRequest {
    /// New read timeout to apply before reporting, if any.
    pub read_timeout: Option<ReadTimeout>,
}

/// Creates a mailslot and returns the creator's handle, which grants read access only.
pub fn create_mailslot(
    ns: &dyn Namespace,
    req: &CreateMailslotRequest<'_>,
) -> Result<SlotHandle<Mailslot>, SlotError> {
    let mailslot = Mailslot::create(ns, req.name, req.max_msgsize, req.read_timeout)?;
    Ok(SlotHandle::new(mailslot, Access::GENERIC_READ, req.inherit))
}

/// Attaches a writer to an existing mailslot and returns its handle with the requested
/// access.
pub fn open_mailslot(
    ns: &dyn Namespace,
    req: &OpenMailslotRequest<'_>,
) -> Result<SlotHandle<MailWriter>, SlotError> {
    let writer = MailWriter::open(ns, req.name, req.access, req.sharing)?;
    Ok(SlotHandle::new(writer, req.access, req.inherit))
}

/// Applies an optional timeout update and reports the slot's current state. Requires only a
/// valid handle; nothing beyond the update is mutated.
pub fn set_mailslot_info(
    handle: &SlotHandle<Mailslot>,
    req: SetMailslotInfoRequest,
) -> MailslotInfo {
    handle.object().set_info(req.read_timeout)
}

//! Shared fixtures: a registry with a slot and writer attached, plus a recorder for the
//! terminal statuses queued reads resolve with.
#![allow(dead_code, unused_macros)]

#[macro_use]
mod eyre;

pub use eyre::*;

use crate::{
    error::AsyncStatus, mailslot::Mailslot, namespace::SyncNamespace, writer::MailWriter, Access,
    ReadTimeout, Sharing,
};
use std::{cell::RefCell, rc::Rc};

pub fn testinit() {
    install();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const SLOT: &str = r"mailslot\fixture";

pub fn slot_with_writer() -> TestResult<(SyncNamespace, Rc<Mailslot>, Rc<MailWriter>)> {
    let ns = SyncNamespace::new();
    let slot = Mailslot::create(&ns, SLOT, 0, ReadTimeout::Forever)?;
    let writer = MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, Sharing::READ | Sharing::WRITE)?;
    Ok((ns, slot, writer))
}

/// Records `(tag, status)` pairs in delivery order.
#[derive(Clone, Default)]
pub struct StatusLog(Rc<RefCell<Vec<(u32, AsyncStatus)>>>);

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }
    /// A completion callback that logs under `tag` when delivered.
    pub fn sink(&self, tag: u32) -> impl FnOnce(AsyncStatus) + 'static {
        let log = Rc::clone(&self.0);
        move |status| log.borrow_mut().push((tag, status))
    }
    pub fn entries(&self) -> Vec<(u32, AsyncStatus)> {
        self.0.borrow().clone()
    }
}

#![doc = include_str!("../README.md")]
#![warn(
    missing_docs,
    clippy::panic_in_result_fn,
    clippy::missing_assert_message,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

mod platform_check;

#[macro_use]
mod macros;

pub mod error;
pub mod mailslot;
pub mod name;
pub mod namespace;
pub mod queue;
pub mod requests;
pub mod writer;

pub mod os;

pub use {
    error::{AsyncStatus, SlotError},
    mailslot::{Interest, Mailslot, MailslotInfo, ReadTimeout},
    name::SlotName,
    namespace::{Namespace, SyncNamespace},
    queue::{AsyncType, ClientId, WaitQueue},
    requests::{
        create_mailslot, open_mailslot, set_mailslot_info, CreateMailslotRequest,
        OpenMailslotRequest, SetMailslotInfoRequest, SlotHandle,
    },
    writer::{Access, MailWriter, Sharing},
};

#[cfg(test)]
#[path = "../tests/index.rs"]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests;

//! The Unix datagram transport: a connected pair of nonblocking `AF_UNIX` `SOCK_DGRAM`
//! sockets. One end becomes a mailslot's read endpoint, the other its write endpoint; the
//! socket type is what preserves message boundaries and makes non-destructive size peeks
//! possible.

mod c_wrappers;
mod dgram;

pub use dgram::{dgram_pair, DgramSocket};

pub(crate) mod unixprelude {
    pub use libc::c_int;
    pub use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
}

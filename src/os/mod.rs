//! Platform-specific plumbing for the datagram transport backing every mailslot.

#[cfg(unix)]
pub mod unix;

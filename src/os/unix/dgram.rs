use super::{c_wrappers, unixprelude::*};
use std::{
    fmt::{self, Debug, Formatter},
    io,
};

/// One endpoint of a connected, message-boundary-preserving datagram channel.
///
/// Both endpoints produced by [`dgram_pair`] are nonblocking: sends against a full buffer and
/// receives against an empty one fail with [`WouldBlock`](io::ErrorKind::WouldBlock) instead
/// of parking the thread.
pub struct DgramSocket(OwnedFd);

impl DgramSocket {
    /// Sends one datagram into the channel.
    ///
    /// # System calls
    /// - `send`
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        c_wrappers::send(self.0.as_fd(), buf)
    }
    /// Receives the next buffered datagram, discarding whatever part of it does not fit into
    /// `buf`.
    ///
    /// # System calls
    /// - `recv`
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        c_wrappers::recv(self.0.as_fd(), buf)
    }
    /// Returns the byte size of the next buffered datagram without consuming it.
    ///
    /// # System calls
    /// - `recv` with `MSG_PEEK | MSG_TRUNC`
    pub fn peek_msgsize(&self) -> io::Result<usize> {
        c_wrappers::peek_msgsize(self.0.as_fd())
    }
    /// Non-blocking readiness probe: whether at least one datagram is currently buffered.
    ///
    /// # System calls
    /// - `poll` with a zero timeout
    pub fn readable(&self) -> bool {
        c_wrappers::poll_readable_now(self.0.as_fd())
    }
}

impl AsFd for DgramSocket {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}
impl From<DgramSocket> for OwnedFd {
    #[inline]
    fn from(x: DgramSocket) -> Self {
        x.0
    }
}
impl From<OwnedFd> for DgramSocket {
    #[inline]
    fn from(fd: OwnedFd) -> Self {
        Self(fd)
    }
}
impl Debug for DgramSocket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DgramSocket").field("fd", &self.0.as_raw_fd()).finish()
    }
}

/// Creates a connected pair of nonblocking datagram endpoints.
///
/// # System calls
/// - `socketpair`
/// - `fcntl` on both descriptors
pub fn dgram_pair() -> io::Result<(DgramSocket, DgramSocket)> {
    let (a, b) = c_wrappers::socketpair_dgram()?;
    c_wrappers::set_nonblocking(a.as_fd())?;
    c_wrappers::set_nonblocking(b.as_fd())?;
    Ok((DgramSocket(a), DgramSocket(b)))
}

use super::unixprelude::*;
use std::io;

pub(super) fn socketpair_dgram() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [c_int; 2] = [-1; 2];
    let success = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_DGRAM, 0, fds.as_mut_ptr()) == 0 };
    ok_or_ret_errno!(success => unsafe {
        // SAFETY: we just created both of those file descriptors, which means that neither of
        // them can be in use elsewhere.
        (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1]))
    })
}

pub(super) fn set_nonblocking(fd: BorrowedFd<'_>) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL, 0) };
    if flags == -1 {
        return Err(io::Error::last_os_error());
    }
    let success = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK) != -1 };
    ok_or_ret_errno!(success => ())
}

/// Zero-timeout poll for input readiness. A poll failure counts as "not readable".
pub(super) fn poll_readable_now(fd: BorrowedFd<'_>) -> bool {
    let mut pfd = libc::pollfd { fd: fd.as_raw_fd(), events: libc::POLLIN, revents: 0 };
    unsafe { libc::poll(&mut pfd, 1, 0) == 1 && pfd.revents & libc::POLLIN != 0 }
}

#[allow(clippy::cast_sign_loss)] // guarded by the >= 0 check
pub(super) fn peek_msgsize(fd: BorrowedFd<'_>) -> io::Result<usize> {
    let mut buf = [0_u8; 0];
    let (success, size) = unsafe {
        let size = libc::recv(
            fd.as_raw_fd(),
            buf.as_mut_ptr().cast(),
            buf.len(),
            libc::MSG_PEEK | libc::MSG_TRUNC,
        );
        (size >= 0, size as usize)
    };
    ok_or_ret_errno!(success => size)
}

#[allow(clippy::cast_sign_loss)] // guarded by the >= 0 check
pub(super) fn send(fd: BorrowedFd<'_>, buf: &[u8]) -> io::Result<usize> {
    let (success, sent) = unsafe {
        let size_or_err = libc::send(fd.as_raw_fd(), buf.as_ptr().cast(), buf.len(), 0);
        (size_or_err >= 0, size_or_err as usize)
    };
    ok_or_ret_errno!(success => sent)
}

#[allow(clippy::cast_sign_loss)] // guarded by the >= 0 check
pub(super) fn recv(fd: BorrowedFd<'_>, buf: &mut [u8]) -> io::Result<usize> {
    let (success, received) = unsafe {
        let size_or_err = libc::recv(fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len(), 0);
        (size_or_err >= 0, size_or_err as usize)
    };
    ok_or_ret_errno!(success => received)
}

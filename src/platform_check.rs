// The transport behind every mailslot is an AF_UNIX SOCK_DGRAM socketpair; there is no
// rendition of it for other platforms.
#[cfg(not(unix))]
compile_error!("this crate requires a Unix platform");

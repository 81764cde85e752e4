//! CLI command implementations

pub mod init;
pub mod sync;
pub mod watch;

//! CLI command implementations

pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod patch;
pub(crate) mod status;

//! Shared utilities: logging setup and KST time helpers.

pub mod logger;
pub mod time;

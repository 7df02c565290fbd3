//! Command implementations

pub mod config;
pub mod init;
pub mod lock;
pub mod start;
pub mod status;
pub mod stop;
pub mod unlock;
pub mod version;

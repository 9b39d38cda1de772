pub mod binaries;
pub mod config;
pub mod gaps;
pub mod init;
pub mod reformat;

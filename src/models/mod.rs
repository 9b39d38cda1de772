pub mod binary_file;
pub mod deployment;
pub mod gap_window;
pub mod segment;

pub mod binaries;
pub mod calculator;
pub mod gaps;
pub mod reformat;
pub mod tbd;

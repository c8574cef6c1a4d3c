// # Settings Source Implementations
//
// This module provides implementations of the SettingsSource trait for
// different storage strategies.

pub mod file;
pub mod memory;

pub use file::FileSettings;
pub use memory::MemorySettings;

// # noip-core
//
// Core library for the No-IP dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the update protocol and control loop:
// - **classify**: Maps the provider's status token to an UpdateOutcome
// - **validate**: Checks host settings and computes the polling interval
// - **UpdateScheduler**: Validates, updates, waits and reconfigures
// - **Collaborator traits**: Settings, UI, transport and wait primitives
//   supplied by the host
//
// ## Design Principles
//
// 1. **Host-Agnostic**: Every host interaction goes through a trait
// 2. **Single Loop**: One sequential task, cancellation only while waiting
// 3. **Never Fatal**: Provider and transport errors are reported, not raised
// 4. **No Credential Leaks**: Username and password never reach a log sink

pub mod classifier;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod settings;
pub mod shutdown;
pub mod traits;

// Re-export core types for convenience
pub use classifier::{OutcomeCode, UpdateOutcome, classify};
pub use config::{Configuration, RawSettings, SchedulerConfig, Validation, validate};
pub use error::{Error, Result, TransportError};
pub use scheduler::{ScheduleState, SchedulerEvent, UpdateScheduler};
pub use settings::{FileSettings, MemorySettings};
pub use shutdown::{Shutdown, ShutdownWaiter};
pub use traits::{AbortWaiter, SettingsSource, UpdateTransport, UserInterface};

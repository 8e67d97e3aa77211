// Data model module
//
// Logical control identifiers and the harness configuration schema.
// No behavior lives here; the driver and the host seams both depend on
// these types.

pub mod config;
pub mod control;

pub use config::{DriverConfig, HarnessConfig, HarnessSettings};
pub use control::ControlId;

// dialog-driver - Thread-affine driver for a modal dialog under test
//
// This is a library crate consumed by a higher-level test-orchestration
// layer. It marshals every dialog interaction onto the single UI-affine
// thread, detects dialog appearance and disappearance under a bounded
// budget, and surfaces "not yet visible" as either a retry or a timeout.

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod models;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use dispatch::{CancelScope, DispatchError, UiDispatcher, UiEventLoop};
pub use driver::{DialogDriver, DriverError};
pub use host::{DialogHandle, DialogSurface, WindowRegistry};
pub use metrics::Metrics;
pub use models::{ControlId, DriverConfig, HarnessConfig, HarnessSettings};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

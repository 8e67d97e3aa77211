//! Host seams - The two collaborators the driver consumes.
//!
//! The driver never talks to a real windowing toolkit. Everything it
//! needs from the host is behind two traits:
//!
//! - [`WindowRegistry`]: enumerate the currently open top-level instances
//!   of the dialog type. The registry answers "zero, one, or more", and
//!   nothing else; the driver owns the single-instance invariant.
//!
//! - [`DialogSurface`]: the dialog's interaction surface. Controls are
//!   addressed by [`ControlId`] and resolved to concrete widgets by the
//!   implementation at call time. All three primitives distinguish
//!   "control could not be resolved" (`None`) from "the simulated action
//!   reported failure" (`Some(false)`).
//!
//! # Threading contract
//!
//! Every method on both traits is only ever invoked from inside a closure
//! dispatched to the UI-affine thread. Implementations may therefore
//! touch live widget state freely; they must still be `Send + Sync`
//! because the trait objects travel through the dispatch queue.
//!
//! # Handle lifetime
//!
//! [`DialogHandle`]s are valid only while the dialog is visible. The
//! driver re-resolves the handle through the registry inside every
//! dispatched closure and never holds one across calls, so a dialog that
//! closes and reopens between operations is picked up fresh.

use crate::models::ControlId;
use std::sync::Arc;

/// Reference to a live dialog instance, resolved per discovery attempt.
pub type DialogHandle = Arc<dyn DialogSurface>;

/// Enumeration of open top-level windows, filtered to the dialog type
/// this driver targets.
#[cfg_attr(test, mockall::automock)]
pub trait WindowRegistry: Send + Sync {
    /// Currently open instances. Order is unspecified; a well-formed host
    /// never has more than one.
    fn open_instances(&self) -> Vec<DialogHandle>;
}

/// The dialog's interaction surface: named controls plus primitive
/// simulated actions.
#[cfg_attr(test, mockall::automock)]
pub trait DialogSurface: Send + Sync {
    /// Simulate a click on `control`. `None` if the control cannot be
    /// resolved, `Some(false)` if the click itself reported failure.
    fn simulate_click(&self, control: ControlId) -> Option<bool>;

    /// Select `text` in the combo named by `control`. With `must_exist`
    /// the item has to match an existing entry exactly; without it the
    /// combo's editable text is set to `text` even if no such item exists.
    fn simulate_select_item(&self, control: ControlId, text: &str, must_exist: bool)
    -> Option<bool>;

    /// The combo's current items, in display order.
    fn read_items(&self, control: ControlId) -> Option<Vec<String>>;
}

// DialogDriver - Drives the modal dialog from the test-execution context
//
// Every public operation follows the same shape: open a hang-mitigation
// scope, dispatch discovery (and the interaction, if any) onto the
// UI-affine thread, and interpret the result as retry, success, or
// failure. Discovery is repeated from scratch on every attempt; a handle
// never survives a single dispatched closure.

use crate::dispatch::{CancelScope, DispatchError, UiDispatcher};
use crate::host::{DialogSurface, WindowRegistry};
use crate::metrics::Metrics;
use crate::models::{ControlId, DriverConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure taxonomy for driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A verify loop exhausted its budget without reaching the target
    /// state.
    #[error("dialog did not reach the expected state within {0:?}")]
    Timeout(Duration),

    /// The hang-mitigation budget fired mid-dispatch.
    #[error("operation cancelled by hang-mitigation budget")]
    Cancelled,

    /// An interaction required the dialog but it is not open.
    #[error("dialog is not open")]
    DialogNotFound,

    /// More than one instance of the dialog type is open. A well-formed
    /// host has at most one; this is an invariant violation, not a state
    /// to retry out of.
    #[error("{0} instances of the dialog are open at once")]
    MultipleInstances(usize),

    /// The named control could not be resolved on the dialog.
    #[error("control not present on the dialog: {0}")]
    ControlNotFound(ControlId),

    /// The simulated click reported failure.
    #[error("simulated click on {0} reported failure")]
    ClickFailed(ControlId),

    /// No item matching the requested text exists in the combo.
    #[error("no item {item:?} in {combo}")]
    ItemNotFound { combo: ControlId, item: String },

    /// The UI event loop has shut down underneath the driver.
    #[error("UI event loop is no longer running")]
    UiLoopClosed,
}

impl From<DispatchError> for DriverError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Cancelled => DriverError::Cancelled,
            DispatchError::LoopClosed => DriverError::UiLoopClosed,
        }
    }
}

/// Controller for the singleton modal dialog.
///
/// Owns a dispatcher handle and the host's window registry. One
/// interaction is in flight per driver at a time: every operation blocks
/// its caller for the full round trip. Concurrent callers against the
/// same dialog are caller-side misuse and get no ordering guarantee.
///
/// # Example
/// ```ignore
/// let (dispatcher, event_loop) = UiDispatcher::channel();
/// host.run_on_ui_thread(move || event_loop.run());
///
/// let driver = DialogDriver::new(dispatcher, registry, DriverConfig::default());
/// driver.verify_open()?;
/// driver.set_accessibility("public")?;
/// driver.click_ok()?;
/// driver.verify_closed()?;
/// ```
pub struct DialogDriver {
    dispatcher: UiDispatcher,
    registry: Arc<dyn WindowRegistry>,
    config: DriverConfig,
    metrics: Arc<Metrics>,
}

impl DialogDriver {
    /// Create a driver over the given dispatcher and host registry.
    pub fn new(
        dispatcher: UiDispatcher,
        registry: Arc<dyn WindowRegistry>,
        config: DriverConfig,
    ) -> Self {
        Self {
            dispatcher,
            registry,
            config,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Metrics collected by this driver instance.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Block until the dialog is open, then until the UI thread has gone
    /// quiescent once more so the dialog's open side effects have settled.
    pub fn verify_open(&self) -> Result<(), DriverError> {
        let scope = self.scope();
        tracing::debug!("Waiting for dialog to open, budget {:?}", scope.budget());

        loop {
            if scope.is_cancelled() {
                self.metrics.record_timeout();
                tracing::warn!("Dialog did not open within {:?}", self.config.hang_timeout);
                return Err(DriverError::Timeout(self.config.hang_timeout));
            }

            if self
                .discover(&scope)
                .map_err(|e| self.budget_exhausted(e))?
            {
                self.wait_for_idle(&scope)
                    .map_err(|e| self.budget_exhausted(e))?;
                tracing::debug!("Dialog is open");
                return Ok(());
            }

            // A bare yield is not enough here: the open notification
            // posts below ordinary dispatch priority, so discovery has
            // to wait for a full quiescent point before retrying.
            self.wait_for_idle(&scope)
                .map_err(|e| self.budget_exhausted(e))?;
            self.metrics.record_discovery_retry();
        }
    }

    /// Block until the dialog is gone.
    pub fn verify_closed(&self) -> Result<(), DriverError> {
        let scope = self.scope();
        tracing::debug!("Waiting for dialog to close, budget {:?}", scope.budget());

        loop {
            if scope.is_cancelled() {
                self.metrics.record_timeout();
                tracing::warn!("Dialog still open after {:?}", self.config.hang_timeout);
                return Err(DriverError::Timeout(self.config.hang_timeout));
            }

            if !self
                .discover(&scope)
                .map_err(|e| self.budget_exhausted(e))?
            {
                tracing::debug!("Dialog is closed");
                return Ok(());
            }

            self.metrics.record_discovery_retry();
            std::thread::yield_now();
            let nap = self.config.poll_interval.min(scope.remaining());
            if !nap.is_zero() {
                std::thread::sleep(nap);
            }
        }
    }

    /// Dismiss the dialog if it is open. Returns whether a dialog was
    /// actually closed; an already-closed dialog is a normal `false`, not
    /// a failure.
    pub fn close_window(&self) -> Result<bool, DriverError> {
        let present = {
            let scope = self.scope();
            self.discover(&scope)?
        };

        if !present {
            tracing::debug!("No dialog open, nothing to close");
            return Ok(false);
        }

        self.click_cancel()?;
        Ok(true)
    }

    /// Click the OK button.
    pub fn click_ok(&self) -> Result<(), DriverError> {
        self.click(ControlId::OkButton)
    }

    /// Click the Cancel button.
    pub fn click_cancel(&self) -> Result<(), DriverError> {
        self.click(ControlId::CancelButton)
    }

    /// Select `value` in the accessibility combo. The item must already
    /// exist; an unknown value fails with [`DriverError::ItemNotFound`]
    /// and leaves the prior selection unchanged.
    pub fn set_accessibility(&self, value: &str) -> Result<(), DriverError> {
        self.select_item(ControlId::AccessibilityCombo, value, true)
    }

    /// Select `value` in the kind combo (exact match required).
    pub fn set_kind(&self, value: &str) -> Result<(), DriverError> {
        self.select_item(ControlId::KindCombo, value, true)
    }

    /// Select `value` in the target-project combo (exact match required).
    pub fn set_target_project(&self, value: &str) -> Result<(), DriverError> {
        self.select_item(ControlId::ProjectCombo, value, true)
    }

    /// Switch the dialog into "create new file" mode and set the new-file
    /// combo's editable text to `name`. The name need not be an existing
    /// item.
    pub fn set_target_file_to_new_name(&self, name: &str) -> Result<(), DriverError> {
        self.set_target_file(ControlId::NewFileToggle, ControlId::NewFileCombo, name)
    }

    /// Switch the dialog into "add to existing file" mode and select
    /// `name` in the existing-file combo, best effort (the item need not
    /// pre-exist at selection time).
    pub fn set_target_file_to_existing(&self, name: &str) -> Result<(), DriverError> {
        self.set_target_file(
            ControlId::ExistingFileToggle,
            ControlId::ExistingFileCombo,
            name,
        )
    }

    /// Read the current items of the new-file combo, in display order.
    pub fn new_file_combo_items(&self) -> Result<Vec<String>, DriverError> {
        let scope = self.scope();
        let items = self.with_dialog(&scope, |dialog| {
            dialog
                .read_items(ControlId::NewFileCombo)
                .ok_or(DriverError::ControlNotFound(ControlId::NewFileCombo))
        })?;

        self.metrics.record_interaction();
        tracing::debug!("Read {} items from new-file combo", items.len());
        Ok(items)
    }

    // ===== Internal plumbing =====

    fn scope(&self) -> CancelScope {
        CancelScope::with_timeout(self.config.hang_timeout)
    }

    /// Verify loops surface budget expiry as `Timeout`; everything else
    /// passes through unchanged.
    fn budget_exhausted(&self, err: DriverError) -> DriverError {
        match err {
            DriverError::Cancelled => {
                self.metrics.record_timeout();
                DriverError::Timeout(self.config.hang_timeout)
            }
            other => other,
        }
    }

    fn run_on_ui<T, F>(&self, scope: &CancelScope, work: F) -> Result<T, DriverError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let started = Instant::now();
        let result = self.dispatcher.run_on_ui(scope, work);
        self.metrics.record_dispatch(started.elapsed());
        if matches!(result, Err(DispatchError::Cancelled)) {
            self.metrics.record_dispatch_cancelled();
        }
        result.map_err(DriverError::from)
    }

    fn wait_for_idle(&self, scope: &CancelScope) -> Result<(), DriverError> {
        self.metrics.record_idle_wait();
        self.dispatcher
            .wait_for_idle(scope)
            .map_err(DriverError::from)
    }

    /// One discovery attempt on the UI thread. `Ok(true)` for exactly one
    /// instance, `Ok(false)` for none; more than one is fatal.
    fn discover(&self, scope: &CancelScope) -> Result<bool, DriverError> {
        let registry = Arc::clone(&self.registry);
        let count = self.run_on_ui(scope, move || registry.open_instances().len())?;

        match count {
            0 => Ok(false),
            1 => Ok(true),
            n => {
                tracing::error!("{} instances of the dialog are open at once", n);
                Err(DriverError::MultipleInstances(n))
            }
        }
    }

    /// Discover the dialog and run `action` against it, all inside one
    /// dispatched closure so the handle never leaves the UI thread.
    fn with_dialog<T, F>(&self, scope: &CancelScope, action: F) -> Result<T, DriverError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DialogSurface) -> Result<T, DriverError> + Send + 'static,
    {
        let registry = Arc::clone(&self.registry);
        self.run_on_ui(scope, move || {
            let mut open = registry.open_instances();
            match open.len() {
                0 => Err(DriverError::DialogNotFound),
                1 => action(open.remove(0).as_ref()),
                n => Err(DriverError::MultipleInstances(n)),
            }
        })?
    }

    fn click(&self, control: ControlId) -> Result<(), DriverError> {
        let scope = self.scope();
        self.with_dialog(&scope, move |dialog| match dialog.simulate_click(control) {
            None => Err(DriverError::ControlNotFound(control)),
            Some(false) => Err(DriverError::ClickFailed(control)),
            Some(true) => Ok(()),
        })?;

        self.metrics.record_interaction();
        tracing::debug!("Clicked {}", control);
        Ok(())
    }

    fn select_item(
        &self,
        combo: ControlId,
        value: &str,
        must_exist: bool,
    ) -> Result<(), DriverError> {
        let scope = self.scope();
        let value = value.to_string();
        let logged = value.clone();

        self.with_dialog(&scope, move |dialog| {
            match dialog.simulate_select_item(combo, &value, must_exist) {
                None => Err(DriverError::ControlNotFound(combo)),
                Some(false) => Err(DriverError::ItemNotFound { combo, item: value }),
                Some(true) => Ok(()),
            }
        })?;

        self.metrics.record_interaction();
        tracing::debug!("Selected {:?} in {}", logged, combo);
        Ok(())
    }

    /// Activate a target-file mode toggle, then set its combo. Both steps
    /// run in a single dispatched closure against the same handle.
    fn set_target_file(
        &self,
        toggle: ControlId,
        combo: ControlId,
        name: &str,
    ) -> Result<(), DriverError> {
        let scope = self.scope();
        let name = name.to_string();
        let logged = name.clone();

        self.with_dialog(&scope, move |dialog| {
            match dialog.simulate_click(toggle) {
                None => return Err(DriverError::ControlNotFound(toggle)),
                Some(false) => return Err(DriverError::ClickFailed(toggle)),
                Some(true) => {}
            }

            match dialog.simulate_select_item(combo, &name, false) {
                None => Err(DriverError::ControlNotFound(combo)),
                Some(false) => Err(DriverError::ItemNotFound { combo, item: name }),
                Some(true) => Ok(()),
            }
        })?;

        self.metrics.record_interaction();
        tracing::debug!("Set {} to {:?} via {}", combo, logged, toggle);
        Ok(())
    }
}

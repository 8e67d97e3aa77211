//! Shared test doubles: a scripted window registry, a fake dialog
//! surface, and a fixture that runs the UI event loop on its own thread.
//!
//! The fakes model the host contract faithfully: all mutation happens
//! inside closures dispatched to the UI thread; the test thread only
//! reads back state after an operation has completed.

// Not every suite touches every helper.
#![allow(dead_code)]

use dialog_driver::{ControlId, DialogHandle, DialogSurface, UiDispatcher, WindowRegistry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Runs the UI event loop on a named thread for the duration of a test.
///
/// The loop exits once every dispatcher clone has been dropped, so no
/// explicit shutdown is needed.
pub struct UiFixture {
    pub dispatcher: UiDispatcher,
}

impl UiFixture {
    pub fn start() -> Self {
        let (dispatcher, event_loop) = UiDispatcher::channel();
        thread::Builder::new()
            .name("ui".into())
            .spawn(move || event_loop.run())
            .expect("failed to spawn UI thread");
        Self { dispatcher }
    }
}

enum FakeControl {
    Button {
        /// A dead button resolves but reports click failure.
        wired: bool,
        clicks: usize,
    },
    Toggle {
        active: bool,
    },
    Combo {
        items: Vec<String>,
        selected: Option<String>,
    },
}

/// In-memory stand-in for the dialog's interaction surface.
///
/// Clicking Cancel or OK marks the dialog invisible, which is how the
/// registry learns it has closed.
pub struct FakeDialog {
    visible: AtomicBool,
    controls: Mutex<HashMap<ControlId, FakeControl>>,
}

impl FakeDialog {
    /// A dialog with the full standard control set, initially invisible.
    pub fn new() -> Self {
        let mut controls = HashMap::new();
        controls.insert(
            ControlId::OkButton,
            FakeControl::Button {
                wired: true,
                clicks: 0,
            },
        );
        controls.insert(
            ControlId::CancelButton,
            FakeControl::Button {
                wired: true,
                clicks: 0,
            },
        );
        controls.insert(ControlId::NewFileToggle, FakeControl::Toggle { active: false });
        controls.insert(
            ControlId::ExistingFileToggle,
            FakeControl::Toggle { active: false },
        );
        controls.insert(
            ControlId::AccessibilityCombo,
            FakeControl::Combo {
                items: vec![
                    "public".to_string(),
                    "internal".to_string(),
                    "private".to_string(),
                ],
                selected: Some("internal".to_string()),
            },
        );
        controls.insert(
            ControlId::KindCombo,
            FakeControl::Combo {
                items: vec![
                    "class".to_string(),
                    "interface".to_string(),
                    "enum".to_string(),
                ],
                selected: Some("class".to_string()),
            },
        );
        controls.insert(
            ControlId::ProjectCombo,
            FakeControl::Combo {
                items: vec!["ConsoleApp".to_string(), "ClassLibrary".to_string()],
                selected: Some("ConsoleApp".to_string()),
            },
        );
        controls.insert(
            ControlId::NewFileCombo,
            FakeControl::Combo {
                items: vec!["Class1.cs".to_string(), "Generated.cs".to_string()],
                selected: None,
            },
        );
        controls.insert(
            ControlId::ExistingFileCombo,
            FakeControl::Combo {
                items: vec!["Program.cs".to_string(), "Utilities.cs".to_string()],
                selected: None,
            },
        );

        Self {
            visible: AtomicBool::new(false),
            controls: Mutex::new(controls),
        }
    }

    /// Remove a control entirely, so lookups return `None`.
    pub fn without_control(self, control: ControlId) -> Self {
        self.controls.lock().unwrap().remove(&control);
        self
    }

    /// Keep the control resolvable but make clicks on it report failure.
    pub fn with_dead_button(self, control: ControlId) -> Self {
        self.controls.lock().unwrap().insert(
            control,
            FakeControl::Button {
                wired: false,
                clicks: 0,
            },
        );
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    /// Selected value of a combo, read back for assertions.
    pub fn selected(&self, combo: ControlId) -> Option<String> {
        match self.controls.lock().unwrap().get(&combo) {
            Some(FakeControl::Combo { selected, .. }) => selected.clone(),
            _ => None,
        }
    }

    /// Whether a mode toggle is currently active.
    pub fn toggle_active(&self, toggle: ControlId) -> bool {
        matches!(
            self.controls.lock().unwrap().get(&toggle),
            Some(FakeControl::Toggle { active: true })
        )
    }

    /// Number of clicks a button has received.
    pub fn clicks(&self, button: ControlId) -> usize {
        match self.controls.lock().unwrap().get(&button) {
            Some(FakeControl::Button { clicks, .. }) => *clicks,
            _ => 0,
        }
    }

    fn activate_toggle(controls: &mut HashMap<ControlId, FakeControl>, toggle: ControlId) {
        let sibling = match toggle {
            ControlId::NewFileToggle => ControlId::ExistingFileToggle,
            ControlId::ExistingFileToggle => ControlId::NewFileToggle,
            _ => unreachable!(),
        };

        if let Some(FakeControl::Toggle { active }) = controls.get_mut(&toggle) {
            *active = true;
        }
        if let Some(FakeControl::Toggle { active }) = controls.get_mut(&sibling) {
            *active = false;
        }
    }
}

impl Default for FakeDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogSurface for FakeDialog {
    fn simulate_click(&self, control: ControlId) -> Option<bool> {
        let mut controls = self.controls.lock().unwrap();
        let is_toggle = match controls.get_mut(&control)? {
            FakeControl::Button { wired, clicks } => {
                if !*wired {
                    return Some(false);
                }
                *clicks += 1;
                false
            }
            FakeControl::Toggle { .. } => true,
            FakeControl::Combo { .. } => return Some(false),
        };

        if is_toggle {
            FakeDialog::activate_toggle(&mut controls, control);
        } else {
            drop(controls);
            // Both buttons dismiss the modal.
            if control == ControlId::OkButton || control == ControlId::CancelButton {
                self.set_visible(false);
            }
        }
        Some(true)
    }

    fn simulate_select_item(
        &self,
        control: ControlId,
        text: &str,
        must_exist: bool,
    ) -> Option<bool> {
        let mut controls = self.controls.lock().unwrap();
        match controls.get_mut(&control)? {
            FakeControl::Combo { items, selected } => {
                if must_exist && !items.iter().any(|item| item == text) {
                    return Some(false);
                }
                *selected = Some(text.to_string());
                Some(true)
            }
            _ => None,
        }
    }

    fn read_items(&self, control: ControlId) -> Option<Vec<String>> {
        match self.controls.lock().unwrap().get(&control)? {
            FakeControl::Combo { items, .. } => Some(items.clone()),
            _ => None,
        }
    }
}

/// Scripted registry: reports every installed dialog that is currently
/// visible.
pub struct FakeRegistry {
    dialogs: Mutex<Vec<Arc<FakeDialog>>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            dialogs: Mutex::new(Vec::new()),
        }
    }

    pub fn install(&self, dialog: Arc<FakeDialog>) {
        self.dialogs.lock().unwrap().push(dialog);
    }
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry for FakeRegistry {
    fn open_instances(&self) -> Vec<DialogHandle> {
        self.dialogs
            .lock()
            .unwrap()
            .iter()
            .filter(|dialog| dialog.is_visible())
            .map(|dialog| dialog.clone() as DialogHandle)
            .collect()
    }
}

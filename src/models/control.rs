use std::fmt;

/// Logical identifier of an interactive element on the dialog.
///
/// A `ControlId` names a control the way a test script refers to it
/// ("the OK button", "the accessibility combo"). Resolution to a concrete
/// widget happens inside the host's [`DialogSurface`] at dispatch time,
/// never in the driver; the driver has no idea what toolkit is behind it.
///
/// [`DialogSurface`]: crate::host::DialogSurface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Button that commits the dialog.
    OkButton,

    /// Button that dismisses the dialog without committing.
    CancelButton,

    /// Combo listing the accessibility choices (public, internal, ...).
    AccessibilityCombo,

    /// Combo listing the kind choices (class, interface, ...).
    KindCombo,

    /// Combo listing the candidate target projects.
    ProjectCombo,

    /// Mode toggle that switches the dialog into "create new file" mode.
    NewFileToggle,

    /// Mode toggle that switches the dialog into "add to existing file" mode.
    ExistingFileToggle,

    /// Editable combo holding the new file name.
    NewFileCombo,

    /// Combo listing the existing candidate files.
    ExistingFileCombo,
}

impl ControlId {
    /// Human-readable label used in log lines and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ControlId::OkButton => "OK button",
            ControlId::CancelButton => "Cancel button",
            ControlId::AccessibilityCombo => "accessibility combo",
            ControlId::KindCombo => "kind combo",
            ControlId::ProjectCombo => "project combo",
            ControlId::NewFileToggle => "new-file mode toggle",
            ControlId::ExistingFileToggle => "existing-file mode toggle",
            ControlId::NewFileCombo => "new-file combo",
            ControlId::ExistingFileCombo => "existing-file combo",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct() {
        let all = [
            ControlId::OkButton,
            ControlId::CancelButton,
            ControlId::AccessibilityCombo,
            ControlId::KindCombo,
            ControlId::ProjectCombo,
            ControlId::NewFileToggle,
            ControlId::ExistingFileToggle,
            ControlId::NewFileCombo,
            ControlId::ExistingFileCombo,
        ];

        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(ControlId::OkButton.to_string(), "OK button");
        assert_eq!(
            ControlId::AccessibilityCombo.to_string(),
            "accessibility combo"
        );
    }
}

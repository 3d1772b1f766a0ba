//! State behind the "edit resort" form: a provider and a name, edited in a
//! modal that only offers to save when something actually changed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resort {
    pub provider: String,
    pub name: String,
}

impl Resort {
    pub fn new(provider: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
        }
    }
}

/// What the open dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView<'a> {
    pub provider: &'a str,
    pub name: &'a str,
    pub update_enabled: bool,
}

#[derive(Debug, Clone, Default)]
enum DialogState {
    #[default]
    Closed,
    Open {
        baseline: Resort,
        current: Resort,
    },
}

#[derive(Debug, Clone, Default)]
pub struct EditResortDialog {
    state: DialogState,
}

impl EditResortDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the form and snapshots `resort` as the baseline for change detection.
    pub fn open(&mut self, resort: &Resort) {
        self.state = DialogState::Open {
            baseline: resort.clone(),
            current: resort.clone(),
        };
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open { .. })
    }

    /// `None` while closed.
    pub fn view(&self) -> Option<FormView<'_>> {
        match &self.state {
            DialogState::Closed => None,
            DialogState::Open { baseline, current } => Some(FormView {
                provider: &current.provider,
                name: &current.name,
                update_enabled: current != baseline,
            }),
        }
    }

    pub fn set_provider(&mut self, provider: &str) {
        if let DialogState::Open { current, .. } = &mut self.state {
            current.provider = provider.to_owned();
        }
    }

    /// Typed input: the first character is upper-cased. A baseline that
    /// starts lowercase can therefore only be restored with [`reset`](Self::reset).
    pub fn set_name(&mut self, name: &str) {
        if let DialogState::Open { current, .. } = &mut self.state {
            current.name = capitalize_first(name);
        }
    }

    /// Restores both fields to the values captured at open time.
    pub fn reset(&mut self) {
        if let DialogState::Open { baseline, current } = &mut self.state {
            *current = baseline.clone();
        }
    }

    pub fn can_update(&self) -> bool {
        self.view().is_some_and(|v| v.update_enabled)
    }

    /// Hands the edited resort to `on_save` and closes. Does nothing when unchanged.
    pub fn update<F: FnOnce(Resort)>(&mut self, on_save: F) -> bool {
        if !self.can_update() {
            return false;
        }
        if let DialogState::Open { current, .. } = std::mem::take(&mut self.state) {
            on_save(current);
        }
        true
    }

    pub fn cancel(&mut self) {
        self.state = DialogState::Closed;
    }
}

/// Upper-cases the first character and leaves the rest as typed.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> EditResortDialog {
        let mut dialog = EditResortDialog::new();
        dialog.open(&Resort::new("Medianet", "maldives"));
        dialog
    }

    #[test]
    fn closed_dialog_renders_nothing() {
        let dialog = EditResortDialog::new();
        assert!(!dialog.is_open());
        assert!(dialog.view().is_none());
        assert!(!dialog.can_update());
    }

    #[test]
    fn update_enabled_only_when_changed_from_baseline() {
        let mut dialog = opened();
        assert!(!dialog.can_update());

        dialog.set_name("Maldives");
        assert!(dialog.can_update());

        dialog.reset();
        assert_eq!(dialog.view().unwrap().name, "maldives");
        assert!(!dialog.can_update());
    }

    #[test]
    fn typed_lowercase_name_stays_capitalized() {
        let mut dialog = opened();
        dialog.set_name("maldives");
        assert_eq!(dialog.view().unwrap().name, "Maldives");
        assert!(dialog.can_update());

        let mut dialog = EditResortDialog::new();
        dialog.open(&Resort::new("Medianet", "Maldives"));
        dialog.set_name("Maldives resort");
        assert!(dialog.can_update());
        dialog.set_name("maldives");
        assert!(!dialog.can_update());
    }

    #[test]
    fn reverting_provider_disables_update() {
        let mut dialog = opened();
        dialog.set_provider("Sabre");
        assert!(dialog.can_update());
        dialog.set_provider("Medianet");
        assert!(!dialog.can_update());
    }

    #[test]
    fn name_is_capitalized_on_first_character_only() {
        let mut dialog = opened();
        dialog.set_name("maldives resort");
        assert_eq!(dialog.view().unwrap().name, "Maldives resort");
        dialog.set_name("mALDIVES");
        assert_eq!(dialog.view().unwrap().name, "MALDIVES");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("élan"), "Élan");
    }

    #[test]
    fn update_emits_edited_values_and_closes() {
        let mut dialog = opened();
        dialog.set_name("baros");

        let mut saved = None;
        assert!(dialog.update(|r| saved = Some(r)));
        assert_eq!(saved, Some(Resort::new("Medianet", "Baros")));
        assert!(!dialog.is_open());
    }

    #[test]
    fn unchanged_update_is_a_no_op() {
        let mut dialog = opened();
        let mut called = false;
        assert!(!dialog.update(|_| called = true));
        assert!(!called);
        assert!(dialog.is_open());
    }

    #[test]
    fn cancel_closes_without_saving() {
        let mut dialog = opened();
        dialog.set_name("Baros");
        dialog.cancel();
        assert!(dialog.view().is_none());

        dialog.open(&Resort::new("Medianet", "Baros"));
        assert!(!dialog.can_update());
    }
}

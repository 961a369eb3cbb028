//! Enumerations for TUI state management.

/// Which view has the keyboard.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    Editor,
    DatePicker,
    Confirm,
    Alert,
    Help,
}

//! Task form handling for the terminal user interface.
//!
//! The form owns the text being typed; the editor draft is the source of
//! truth for everything else. Each text edit is pushed into the draft for the
//! field it touched, so untouched fields keep their server values.

use crate::{
    editor::Editor,
    error::EditorError,
    task::Task,
    tui::input::InputField,
};

/// Global order constants for the editor fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const PRIORITY_GLOBAL_ORDER: usize = 2;
pub const STATUS_GLOBAL_ORDER: usize = 3;
pub const DUE_GLOBAL_ORDER: usize = 4;

/// Task form for editing fields
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub priority: InputField,
    pub current_field: usize,
}

impl TaskForm {
    /// A form for a blank draft.
    pub fn new() -> Self {
        Self::from_task(&Task::draft())
    }

    /// Create a task form populated from a task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = TaskForm {
            title: InputField::with_value(&task.title),
            description: InputField::with_value(task.description.as_deref().unwrap_or_default()),
            priority: InputField::with_value(&task.priority.to_string()),
            current_field: TITLE_GLOBAL_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Get mutable references to all input fields in visual order.
    pub fn fields_mut(&mut self) -> Vec<&mut InputField> {
        vec![&mut self.title, &mut self.description, &mut self.priority]
    }

    /// Get the total number of fields (input fields + selectors).
    pub fn field_count(&self) -> usize {
        5 // 3 text fields + status selector + due date
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.field_count();
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.field_count() - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        for field in self.fields_mut() {
            field.active = false;
        }
        if let Some(field) = self.active_input() {
            field.active = true;
        }
    }

    /// The text field under the cursor, if the current field is one.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            PRIORITY_GLOBAL_ORDER => Some(&mut self.priority),
            _ => None,
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) -> bool {
        self.edit(|field| field.handle_char(c))
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) -> bool {
        self.edit(InputField::handle_backspace)
    }

    /// Handle delete input for the currently active field.
    pub fn handle_delete(&mut self) -> bool {
        self.edit(InputField::handle_delete)
    }

    fn edit(&mut self, f: impl FnOnce(&mut InputField)) -> bool {
        match self.active_input() {
            Some(field) => {
                f(field);
                true
            }
            None => false,
        }
    }

    /// Handle left/right arrow keys for cursor movement or the status selector.
    pub fn handle_left_right(&mut self, right: bool, editor: &mut Editor) -> Result<(), EditorError> {
        if self.current_field == STATUS_GLOBAL_ORDER {
            editor.cycle_status(right)?;
        } else if let Some(field) = self.active_input() {
            if right {
                field.move_cursor_right()
            } else {
                field.move_cursor_left()
            }
        }
        Ok(())
    }

    /// Push the current text field into the draft.
    pub fn sync_current(&self, editor: &mut Editor) -> Result<(), EditorError> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => editor.set_title(&self.title.value),
            DESCRIPTION_GLOBAL_ORDER => editor.set_description(&self.description.value),
            PRIORITY_GLOBAL_ORDER => editor.set_priority_text(&self.priority.value).map(|_| ()),
            _ => Ok(()),
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;

    #[test]
    fn test_typing_updates_only_the_touched_field() {
        let task = Task { id: Some(1), title: "A".into(), description: None, ..Task::draft() };
        let mut editor = Editor::new();
        editor.open_existing(&task).unwrap();
        let mut form = TaskForm::from_task(&task);

        assert!(form.handle_char('b'));
        form.sync_current(&mut editor).unwrap();
        let draft = editor.draft().unwrap();
        assert_eq!(draft.title, "Ab");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_priority_text_is_coerced() {
        let mut editor = Editor::new();
        editor.open_new().unwrap();
        let mut form = TaskForm::new();
        form.next_field();
        form.next_field();
        assert_eq!(form.current_field, PRIORITY_GLOBAL_ORDER);
        form.handle_backspace();
        for c in "x7".chars() {
            form.handle_char(c);
            form.sync_current(&mut editor).unwrap();
        }
        assert_eq!(form.priority.value, "x7");
        assert_eq!(editor.draft().unwrap().priority, 0);
    }

    #[test]
    fn test_status_selector_cycles_draft() {
        let mut editor = Editor::new();
        editor.open_new().unwrap();
        let mut form = TaskForm::new();
        form.current_field = STATUS_GLOBAL_ORDER;
        form.update_active_field();
        assert!(!form.handle_char('z'));
        form.handle_left_right(false, &mut editor).unwrap();
        assert_eq!(editor.draft().unwrap().status, Status::Done);
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = TaskForm::new();
        form.prev_field();
        assert_eq!(form.current_field, DUE_GLOBAL_ORDER);
        form.next_field();
        assert_eq!(form.current_field, TITLE_GLOBAL_ORDER);
        assert!(form.title.active);
    }
}

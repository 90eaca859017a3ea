//! Inline buttons attached to a message

use serde::{Deserialize, Serialize};

/// One button: what the user sees and the token it sends back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub action: String,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// Rows of buttons, top to bottom
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<ActionButton>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<ActionButton>>) -> Self {
        Self {
            rows: rows.into_iter().filter(|row| !row.is_empty()).collect(),
        }
    }

    pub fn single_row(buttons: Vec<ActionButton>) -> Self {
        Self::new(vec![buttons])
    }

    /// Every action token on the keyboard
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.action.as_str())
    }
}

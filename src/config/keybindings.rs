use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub open: KeyBinding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalKeybindings {
    pub submit: KeyBinding,
    pub dismiss: KeyBinding,
    pub next: KeyBinding,
    pub previous: KeyBinding,
    pub activate: KeyBinding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub modal: ModalKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            open: Key::new(KeyCode::Char('o')).into(),
        }
    }
}

impl Default for ModalKeybindings {
    fn default() -> Self {
        Self {
            submit: Key::new(KeyCode::Enter).into(),
            dismiss: Key::new(KeyCode::Esc).into(),
            next: Key::new(KeyCode::Tab).into(),
            previous: KeyBinding::multiple(vec![
                Key::with_shift(KeyCode::BackTab),
                Key::new(KeyCode::BackTab),
            ]),
            activate: Key::new(KeyCode::Char(' ')).into(),
        }
    }
}

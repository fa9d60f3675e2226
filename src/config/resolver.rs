use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{GlobalAction, ModalAction};
use crate::config::keybindings::KeybindingsConfig;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Open => kb.open.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Open => kb.open.display(),
        }
    }

    // Dialog actions
    pub fn matches_modal(&self, event: &KeyEvent, action: ModalAction) -> bool {
        let kb = &self.keybindings.modal;
        match action {
            ModalAction::Submit => kb.submit.matches(event),
            ModalAction::Dismiss => kb.dismiss.matches(event),
            ModalAction::Next => kb.next.matches(event),
            ModalAction::Previous => kb.previous.matches(event),
            ModalAction::Activate => kb.activate.matches(event),
        }
    }

    pub fn display_modal(&self, action: ModalAction) -> String {
        let kb = &self.keybindings.modal;
        match action {
            ModalAction::Submit => kb.submit.display(),
            ModalAction::Dismiss => kb.dismiss.display(),
            ModalAction::Next => kb.next.display(),
            ModalAction::Previous => kb.previous.display(),
            ModalAction::Activate => kb.activate.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn test_default_submit_is_enter() {
        let resolver = KeyResolver::default();
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

        assert!(resolver.matches_modal(&enter, ModalAction::Submit));
        assert!(!resolver.matches_modal(&enter, ModalAction::Dismiss));
        assert_eq!(resolver.display_modal(ModalAction::Submit), "Enter");
    }

    #[test]
    fn test_backtab_with_and_without_shift() {
        let resolver = KeyResolver::default();
        let shifted = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        let bare = KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE);

        assert!(resolver.matches_modal(&shifted, ModalAction::Previous));
        assert!(resolver.matches_modal(&bare, ModalAction::Previous));
    }

    #[test]
    fn test_global_display() {
        let resolver = KeyResolver::default();
        assert_eq!(resolver.display_global(GlobalAction::Quit), "q");
        assert_eq!(resolver.display_global(GlobalAction::Open), "o");
    }
}

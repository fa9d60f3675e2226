pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{ConfigError, load};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

use crate::ui::ButtonSize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Defaults for dialogs opened by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub close_on_submit: bool,
    pub size: ButtonSize,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            close_on_submit: true,
            size: ButtonSize::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub modal: ModalConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

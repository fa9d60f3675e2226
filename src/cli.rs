use clap::Parser;

use crate::config::ModalConfig;
use crate::ui::{ButtonSize, DisplayTitle};

#[derive(Parser, Debug)]
#[command(name = "modalkit", version, about = "Open a dialog with a cancel/submit footer")]
pub struct Args {
    /// Dialog title (defaults to the product name)
    #[arg(short, long, conflicts_with = "no_title")]
    pub title: Option<String>,

    /// Show no title region
    #[arg(long)]
    pub no_title: bool,

    /// Label of the primary button
    #[arg(short, long, default_value = "Submit", conflicts_with = "no_action")]
    pub action: String,

    /// Show no footer; Enter then does nothing
    #[arg(long)]
    pub no_action: bool,

    /// Label shown on the primary button while submitting
    #[arg(long)]
    pub loading_text: Option<String>,

    /// Primary button size
    #[arg(long, value_enum)]
    pub size: Option<ButtonSize>,

    /// Start with the primary button disabled
    #[arg(long)]
    pub disabled: bool,

    /// Keep the dialog open after submitting and simulate work
    #[arg(long)]
    pub keep_open: bool,

    /// Body text of the dialog
    #[arg(default_value = "Press Enter to submit, Esc to dismiss.")]
    pub body: String,
}

/// Everything needed to build the demo dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogOptions {
    pub title: Option<DisplayTitle>,
    pub action: Option<String>,
    pub loading_text: Option<String>,
    pub size: ButtonSize,
    pub disabled: bool,
    pub close_on_submit: bool,
    pub body: String,
}

impl Args {
    /// Merge flags over config defaults.
    pub fn dialog_options(&self, config: &ModalConfig) -> DialogOptions {
        let title = if self.no_title {
            None
        } else {
            Some(
                self.title
                    .clone()
                    .map_or(DisplayTitle::ProductName, DisplayTitle::Text),
            )
        };

        DialogOptions {
            title,
            action: (!self.no_action).then(|| self.action.clone()),
            loading_text: self.loading_text.clone(),
            size: self.size.unwrap_or(config.size),
            disabled: self.disabled,
            close_on_submit: config.close_on_submit && !self.keep_open,
            body: self.body.clone(),
        }
    }
}

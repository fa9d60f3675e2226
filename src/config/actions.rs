#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Submit from anywhere while a dialog is mounted.
    Submit,
    Dismiss,
    Next,
    Previous,
    /// Press the focused control.
    Activate,
}

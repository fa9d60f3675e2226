//! UI building blocks for the dialog.
//!
//! This module defines the core UI abstractions:
//! - [`Component`] - Reusable, interactive UI building blocks
//! - [`ModalInside`] - The inner content of a dialog with a cancel/submit footer
//! - [`KeyListeners`] - Document-level key listeners with scoped subscriptions
//! - [`Handled`] - Result of handling an input event

mod button;
mod component;
mod listeners;
mod modal;
mod modal_inside;

pub use button::{Button, ButtonKind, ButtonSize};
pub use component::Component;
pub use listeners::{KeyListeners, Subscription};
pub use modal::{CloseModal, ModalHandle};
pub use modal_inside::{ActionSpec, Control, DisplayTitle, Focus, Loading, ModalEvent, ModalInside};

/// Result type alias for UI operations.
pub type Result<T> = std::result::Result<T, color_eyre::Report>;

/// Result of handling an input event.
///
/// This enum represents the three possible outcomes of handling a key event:
/// - `Ignored` - The handler didn't recognize or handle this input
/// - `Consumed` - The input was handled but produced no message
/// - `Event(E)` - The input was handled and produced a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> Handled<E> {
    /// Returns true if the input was consumed (not ignored).
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Returns the event if present.
    pub fn event(self) -> Option<E> {
        match self {
            Self::Event(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<E> for Handled<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

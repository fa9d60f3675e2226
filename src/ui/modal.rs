//! The "close the current dialog" capability.

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::app::Command;

/// Closes whichever dialog is currently displayed.
///
/// Implementations must be idempotent: closing when nothing is open is a
/// no-op.
pub trait CloseModal {
    fn close(&self);
}

/// Close capability backed by the application's command channel.
///
/// The close is deferred: the host drops the dialog when it drains the
/// command queue, never in the middle of a key dispatch.
#[derive(Clone)]
pub struct ModalHandle {
    command_tx: UnboundedSender<Command>,
}

impl ModalHandle {
    pub const fn new(command_tx: UnboundedSender<Command>) -> Self {
        Self { command_tx }
    }
}

impl CloseModal for ModalHandle {
    fn close(&self) {
        if self.command_tx.send(Command::CloseModal).is_err() {
            warn!("Command channel closed, dropping close request");
        }
    }
}

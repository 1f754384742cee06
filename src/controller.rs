use tokio::sync::mpsc;

pub mod edit;
pub mod list;

pub use edit::{EditController, EditPhase};
pub use list::ListController;

/// Commands emitted to the UI collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Route to a hash location such as `/#alerts`
    Navigate(String),
    /// Show the delete confirmation for a staged record
    RequestConfirmation { id: String },
    /// Hide the delete confirmation
    CloseConfirmation,
}

pub type UiSender = mpsc::UnboundedSender<UiCommand>;
pub type UiReceiver = mpsc::UnboundedReceiver<UiCommand>;

/// Create the channel between controllers and the UI
pub fn ui_channel() -> (UiSender, UiReceiver) {
    mpsc::unbounded_channel()
}

pub(crate) fn emit(ui: &UiSender, command: UiCommand) {
    tracing::debug!(?command, "Emitting UI command");

    if ui.send(command).is_err() {
        tracing::debug!("UI receiver dropped, command ignored");
    }
}

use crate::{
    controller::{UiCommand, UiSender, emit},
    entity::Entity,
    error::{PortalError, Result},
    list::{EntityFetch, PaginatedList, QueryOutcome},
    portal::{Backend, csrf::CsrfToken},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteStage {
    Idle,
    /// Waiting for the user to confirm
    Staged(String),
    /// Delete request outstanding; further deletes are disabled
    InFlight(String),
}

#[derive(Debug)]
struct DeleteState {
    stage: DeleteStage,
    error: Option<PortalError>,
}

/// List screen state for one entity type, with staged delete confirmation
pub struct ListController<E, B> {
    list: PaginatedList<E, EntityFetch<E, B>>,
    backend: Arc<B>,
    csrf: CsrfToken,
    ui: UiSender,
    delete: Mutex<DeleteState>,
}

impl<E: Entity, B: Backend> ListController<E, B> {
    pub fn new(backend: Arc<B>, csrf: CsrfToken, ui: UiSender) -> Self {
        Self {
            list: PaginatedList::new(EntityFetch::new(backend.clone())),
            backend,
            csrf,
            ui,
            delete: Mutex::new(DeleteState {
                stage: DeleteStage::Idle,
                error: None,
            }),
        }
    }

    /// Issue the initial query
    pub async fn start(&self) -> Result<QueryOutcome> {
        self.list.query(None).await
    }

    pub fn list(&self) -> &PaginatedList<E, EntityFetch<E, B>> {
        &self.list
    }

    /// Identifier staged or being deleted, if any
    pub fn deleting_id(&self) -> Option<String> {
        match &self.state().stage {
            DeleteStage::Idle => None,
            DeleteStage::Staged(id) | DeleteStage::InFlight(id) => Some(id.clone()),
        }
    }

    /// Whether a delete request is outstanding
    pub fn delete_in_flight(&self) -> bool {
        matches!(self.state().stage, DeleteStage::InFlight(_))
    }

    /// Error of the last failed delete, cleared when a new one is staged
    pub fn delete_error(&self) -> Option<PortalError> {
        self.state().error.clone()
    }

    /// Stage a record for deletion and ask the UI for confirmation.
    ///
    /// Returns `false` without doing anything while a delete is in flight.
    pub fn remove(&self, record: &E) -> bool {
        let mut state = self.state();

        if let DeleteStage::InFlight(id) = &state.stage {
            tracing::debug!("Delete of {} in flight, ignoring remove of {}", id, record.id());
            return false;
        }

        state.stage = DeleteStage::Staged(record.id().to_string());
        state.error = None;
        drop(state);

        emit(
            &self.ui,
            UiCommand::RequestConfirmation {
                id: record.id().to_string(),
            },
        );

        true
    }

    /// Delete the staged record and refresh the list.
    ///
    /// Returns the deleted id, or `None` when nothing was staged. On failure
    /// the record stays staged and confirmation is requested again.
    #[tracing::instrument(skip(self), fields(entity = %E::KIND))]
    pub async fn confirm_delete(&self) -> Result<Option<String>> {
        let id = {
            let mut state = self.state();
            let DeleteStage::Staged(id) = &state.stage else {
                return Ok(None);
            };
            let id = id.clone();
            state.stage = DeleteStage::InFlight(id.clone());
            id
        };

        tracing::info!("Deleting {}", id);

        if let Err(err) = self.backend.delete(E::KIND, &id, &self.csrf).await {
            tracing::warn!("Failed to delete {}: {}", id, err);
            {
                let mut state = self.state();
                state.stage = DeleteStage::Staged(id.clone());
                state.error = Some(err.clone());
            }
            emit(&self.ui, UiCommand::RequestConfirmation { id });

            return Err(err);
        }

        {
            let mut state = self.state();
            state.stage = DeleteStage::Idle;
            state.error = None;
        }
        emit(&self.ui, UiCommand::CloseConfirmation);

        if let Err(err) = self.list.query(None).await {
            tracing::warn!("Refresh after delete failed: {}", err);
        }

        Ok(Some(id))
    }

    /// Abandon a staged delete
    pub fn cancel_delete(&self) {
        let mut state = self.state();

        if let DeleteStage::Staged(_) = state.stage {
            state.stage = DeleteStage::Idle;
            drop(state);
            emit(&self.ui, UiCommand::CloseConfirmation);
        }
    }

    fn state(&self) -> MutexGuard<'_, DeleteState> {
        self.delete.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

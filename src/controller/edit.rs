use crate::{
    controller::{UiCommand, UiSender, emit},
    entity::Entity,
    error::{PortalError, Result},
    portal::{Backend, csrf::CsrfToken},
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Loading,
    Editing,
    Saving,
    /// Navigation back to the list has been requested
    Done,
}

/// Create/edit form state for one record.
///
/// The record is the set of bound fields; a failed load or save leaves it
/// untouched and records the error for display next to the form.
pub struct EditController<E, B> {
    backend: Arc<B>,
    csrf: CsrfToken,
    ui: UiSender,
    record: E,
    phase: EditPhase,
    error: Option<PortalError>,
}

impl<E: Entity, B: Backend> EditController<E, B> {
    pub fn new(backend: Arc<B>, csrf: CsrfToken, ui: UiSender) -> Self {
        Self {
            backend,
            csrf,
            ui,
            record: E::default(),
            phase: EditPhase::Editing,
            error: None,
        }
    }

    /// Load an existing record, or start a new one with a fresh identifier
    #[tracing::instrument(skip(self), fields(entity = %E::KIND))]
    pub async fn activate(&mut self, id: Option<&str>) -> Result<()> {
        self.error = None;

        let Some(id) = id else {
            self.record = E::blank(Uuid::new_v4().to_string());
            self.phase = EditPhase::Editing;
            tracing::info!("Editing new record {}", self.record.id());

            return Ok(());
        };

        self.phase = EditPhase::Loading;
        self.record = E::blank(id.to_string());

        let loaded = match self.backend.get(E::KIND, id).await {
            Ok(value) => E::decode(value),
            Err(err) => Err(err),
        };
        self.phase = EditPhase::Editing;

        match loaded {
            Ok(record) => {
                self.record = record;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Failed to load record: {}", err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Persist the bound fields and navigate back to the list
    #[tracing::instrument(skip(self), fields(entity = %E::KIND, id = %self.record.id()))]
    pub async fn save(&mut self) -> Result<()> {
        if self.record.id().is_empty() {
            let err = PortalError::InvalidTarget(format!(
                "{} has no id; activate the form before saving",
                E::KIND.route()
            ));
            tracing::warn!("Refusing to save: {}", err);
            self.error = Some(err.clone());

            return Err(err);
        }

        self.phase = EditPhase::Saving;
        self.error = None;

        let result = match self.record.encode() {
            Ok(body) => self.backend.upsert(E::KIND, &body, &self.csrf).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                tracing::info!("Record saved");
                self.phase = EditPhase::Done;
                emit(&self.ui, UiCommand::Navigate(E::KIND.list_route()));

                Ok(())
            }
            Err(err) => {
                tracing::warn!("Failed to save record: {}", err);
                self.phase = EditPhase::Editing;
                self.error = Some(err.clone());

                Err(err)
            }
        }
    }

    /// Drop the in-progress edits and navigate back to the list
    pub fn cancel(&mut self) {
        self.record = E::default();
        self.error = None;
        self.phase = EditPhase::Done;
        emit(&self.ui, UiCommand::Navigate(E::KIND.list_route()));
    }

    pub fn record(&self) -> &E {
        &self.record
    }

    /// Bound fields, for the form to write into
    pub fn record_mut(&mut self) -> &mut E {
        &mut self.record
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&PortalError> {
        self.error.as_ref()
    }
}

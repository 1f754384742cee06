use crate::{
    Command,
    config::Config,
    controller::{EditController, ListController, UiCommand, UiReceiver, ui_channel},
    entity::{Alert, Entity, EntityKind, NotificationGroup, PagerDutyEndpoint, Report},
    error::PortalError,
    portal::{PortalClient, csrf::CsrfToken, query::ListQuery},
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Run `$body` with `$entity` bound to the record type of `$kind`
macro_rules! with_entity {
    ($kind:expr, $entity:ident => $body:expr) => {
        match $kind {
            EntityKind::Alert => {
                type $entity = Alert;
                $body
            }
            EntityKind::NotificationGroup => {
                type $entity = NotificationGroup;
                $body
            }
            EntityKind::PagerDutyEndpoint => {
                type $entity = PagerDutyEndpoint;
                $body
            }
            EntityKind::Report => {
                type $entity = Report;
                $body
            }
        }
    };
}

/// Terminal front-end: drives the controllers and plays the UI collaborator
pub struct Console {
    backend: Arc<PortalClient>,
    csrf: CsrfToken,
}

impl Console {
    /// Create a new Console from the loaded configuration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = Arc::new(PortalClient::new(&config.portal)?);

        Ok(Self {
            backend,
            csrf: config.portal.csrf_token,
        })
    }

    /// Execute a single command
    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::List {
                kind,
                page,
                page_size,
                search,
            } => {
                let query = ListQuery {
                    page,
                    page_size,
                    search,
                    ..Default::default()
                };
                with_entity!(kind, E => self.list::<E>(query).await)
            }
            Command::Show { kind, id } => with_entity!(kind, E => self.show::<E>(&id).await),
            Command::New { kind } => with_entity!(kind, E => self.new_record::<E>().await),
            Command::Put { kind, file } => with_entity!(kind, E => self.put::<E>(&file).await),
            Command::Delete { kind, id, yes } => {
                with_entity!(kind, E => self.delete::<E>(&id, yes).await)
            }
        }
    }

    fn list_controller<E: Entity>(&self) -> (ListController<E, PortalClient>, UiReceiver) {
        let (ui, rx) = ui_channel();
        (
            ListController::new(self.backend.clone(), self.csrf.clone(), ui),
            rx,
        )
    }

    fn edit_controller<E: Entity>(&self) -> (EditController<E, PortalClient>, UiReceiver) {
        let (ui, rx) = ui_channel();
        (
            EditController::new(self.backend.clone(), self.csrf.clone(), ui),
            rx,
        )
    }

    async fn list<E: Entity>(&self, query: ListQuery) -> anyhow::Result<()> {
        let (controller, _rx) = self.list_controller::<E>();
        controller.list().query(Some(query)).await?;

        let state = controller.list().snapshot();
        for item in &state.items {
            println!("{}\t{}\t{}", item.id(), item.edit_uri(), item.encode()?);
        }

        let total = state
            .pagination
            .total_count
            .map(|total| total.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "-- {} {} shown, {} total",
            state.items.len(),
            E::KIND,
            total
        );

        Ok(())
    }

    async fn show<E: Entity>(&self, id: &str) -> anyhow::Result<()> {
        let (mut controller, _rx) = self.edit_controller::<E>();
        controller.activate(Some(id)).await?;

        let record = controller.record();
        println!("{}", serde_json::to_string_pretty(&record.encode()?)?);
        println!("-- {}", record.edit_uri());

        Ok(())
    }

    async fn new_record<E: Entity>(&self) -> anyhow::Result<()> {
        let (mut controller, _rx) = self.edit_controller::<E>();
        controller.activate(None).await?;

        println!(
            "{}",
            serde_json::to_string_pretty(&controller.record().encode()?)?
        );

        Ok(())
    }

    /// Create or replace a record from a JSON file. A file without an id gets a fresh one.
    async fn put<E: Entity>(&self, file: &Path) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(file)?;
        let mut value: Value = serde_json::from_str(&content)?;

        let id = value
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let (mut controller, mut rx) = self.edit_controller::<E>();
        match controller.activate(id.as_deref()).await {
            Ok(()) => tracing::info!("Replacing existing {} record", E::KIND.route()),
            Err(PortalError::NotFound { .. }) => {
                tracing::info!("Creating new {} record", E::KIND.route())
            }
            Err(err) => return Err(err.into()),
        }

        if let Some(fields) = value.as_object_mut() {
            fields.insert(
                "id".to_string(),
                Value::String(controller.record().id().to_string()),
            );
        }
        *controller.record_mut() = E::decode(value)?;

        controller.save().await?;

        while let Ok(command) = rx.try_recv() {
            if let UiCommand::Navigate(route) = command {
                tracing::info!("Saved, returning to {}", route);
            }
        }
        println!("{}", controller.record().id());

        Ok(())
    }

    async fn delete<E: Entity>(&self, id: &str, yes: bool) -> anyhow::Result<()> {
        let (controller, mut rx) = self.list_controller::<E>();
        // An undecodable page must not block deleting the record that breaks it.
        if let Err(err) = controller.start().await {
            tracing::warn!("Could not load {}: {}", E::KIND, err);
        }

        if !controller.remove(&E::blank(id.to_string())) {
            anyhow::bail!("Another delete is still in flight");
        }

        while let Some(command) = rx.recv().await {
            match command {
                UiCommand::RequestConfirmation { id } => {
                    if let Some(err) = controller.delete_error() {
                        eprintln!("Delete failed: {err}");
                    }

                    let question = format!("Delete {} {}? [y/N] ", E::KIND.route(), id);
                    if !yes && !prompt(&question).await? {
                        controller.cancel_delete();
                        continue;
                    }

                    // A failure re-requests confirmation through the channel.
                    if let Err(err) = controller.confirm_delete().await {
                        if yes {
                            return Err(err.into());
                        }
                    }
                }
                UiCommand::CloseConfirmation => break,
                UiCommand::Navigate(route) => tracing::debug!("Ignoring navigation to {}", route),
            }
        }

        let remaining = controller.list().pagination().total_count;
        println!(
            "-- {} remaining: {}",
            E::KIND,
            remaining.map(|n| n.to_string()).unwrap_or_else(|| "?".into())
        );

        Ok(())
    }
}

/// Ask a yes/no question on the terminal
async fn prompt(question: &str) -> anyhow::Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

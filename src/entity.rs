use crate::error::{PortalError, Result};
use serde::{Deserialize, Deserializer, Serialize};

pub mod alert;
pub mod notification_group;
pub mod pagerduty;
pub mod report;

pub use alert::Alert;
pub use notification_group::{NotificationGroup, Recipient};
pub use pagerduty::PagerDutyEndpoint;
pub use report::Report;

/// The entity types managed by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum EntityKind {
    #[value(name = "alerts")]
    Alert,
    #[value(name = "notificationgroups")]
    NotificationGroup,
    #[value(name = "pagerdutyendpoints")]
    PagerDutyEndpoint,
    #[value(name = "reports")]
    Report,
}

impl EntityKind {
    /// Singular route segment used in edit links
    pub fn route(self) -> &'static str {
        match self {
            EntityKind::Alert => "alert",
            EntityKind::NotificationGroup => "notificationgroup",
            EntityKind::PagerDutyEndpoint => "pagerdutyendpoint",
            EntityKind::Report => "report",
        }
    }

    /// Plural path segment used by the REST API and the list route
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Alert => "alerts",
            EntityKind::NotificationGroup => "notificationgroups",
            EntityKind::PagerDutyEndpoint => "pagerdutyendpoints",
            EntityKind::Report => "reports",
        }
    }

    /// Hash link to the edit screen of a record
    pub fn edit_uri(self, id: &str) -> String {
        format!("#{}/edit/{}", self.route(), id)
    }

    /// Location the UI returns to after a save or cancel
    pub fn list_route(self) -> String {
        format!("/#{}", self.collection())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection())
    }
}

/// A record that can be listed, edited and deleted through the portal API.
///
/// `decode` is the single entry point from wire JSON into the in-memory
/// shape; implementations reject records without an identifier.
pub trait Entity: Serialize + Clone + Default + std::fmt::Debug {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn decode(value: serde_json::Value) -> Result<Self>;

    /// Derived edit link, always computed from the current identifier
    fn edit_uri(&self) -> String {
        Self::KIND.edit_uri(self.id())
    }

    fn encode(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// An empty record carrying only the given identifier
    fn blank(id: String) -> Self {
        let mut record = Self::default();
        record.set_id(id);
        record
    }
}

/// Read an explicit `null` as the field's empty value, the same as a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Reject decoded records whose identifier is empty
pub(crate) fn require_id<E: Entity>(record: E) -> Result<E> {
    if record.id().is_empty() {
        return Err(PortalError::Decode(format!(
            "{} record is missing an id",
            E::KIND.route()
        )));
    }

    Ok(record)
}

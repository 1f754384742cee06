use crate::{
    entity::{Entity, EntityKind, null_as_default, require_id},
    error::Result,
};
use serde::{Deserialize, Serialize};

/// A PagerDuty integration endpoint.
///
/// The backend names the integration URL `address`; older payloads call it
/// `pagerDutyUrl`. Both decode into `address`, and only `address` is written.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PagerDutyEndpoint {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(alias = "pagerDutyUrl", deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub service_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
}

impl Entity for PagerDutyEndpoint {
    const KIND: EntityKind = EntityKind::PagerDutyEndpoint;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn decode(value: serde_json::Value) -> Result<Self> {
        require_id(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_both_address_spellings() {
        let canonical = PagerDutyEndpoint::decode(json!({
            "id": "p1",
            "name": "primary",
            "address": "https://events.pagerduty.com/v2/enqueue",
            "serviceKey": "abc"
        }))
        .unwrap();

        let legacy = PagerDutyEndpoint::decode(json!({
            "id": "p1",
            "name": "primary",
            "pagerDutyUrl": "https://events.pagerduty.com/v2/enqueue",
            "serviceKey": "abc"
        }))
        .unwrap();

        assert_eq!(canonical, legacy);
        assert_eq!(canonical.service_key, "abc");
        assert_eq!(canonical.edit_uri(), "#pagerdutyendpoint/edit/p1");
    }

    #[test]
    fn test_decode_null_fields_as_empty() {
        let endpoint = PagerDutyEndpoint::decode(json!({
            "id": "p3",
            "name": null,
            "pagerDutyUrl": null,
            "serviceKey": "abc",
            "comment": null
        }))
        .unwrap();

        assert_eq!(
            endpoint,
            PagerDutyEndpoint {
                id: "p3".into(),
                service_key: "abc".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_encode_writes_canonical_address() {
        let endpoint = PagerDutyEndpoint {
            id: "p2".into(),
            address: "https://pd".into(),
            ..Default::default()
        };

        let value = endpoint.encode().unwrap();
        assert_eq!(value["address"], "https://pd");
        assert!(value.get("pagerDutyUrl").is_none());
    }
}

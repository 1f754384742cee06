use crate::{
    entity::{Entity, EntityKind, null_as_default, require_id},
    error::Result,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(deserialize_with = "null_as_default")]
    pub check_interval: String,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notification_group_id: String,
}

impl Entity for Alert {
    const KIND: EntityKind = EntityKind::Alert;

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
    fn test_decode() {
        let alert = Alert::decode(json!({
            "id": "a1",
            "name": "High error rate",
            "query": "select errors > 10",
            "checkInterval": "PT1M",
            "comment": "page the owner",
            "notificationGroupId": "g1",
            "extra": true
        }))
        .unwrap();

        assert_eq!(alert.name, "High error rate");
        assert_eq!(alert.query, "select errors > 10");
        assert_eq!(alert.check_interval, "PT1M");
        assert_eq!(alert.notification_group_id, "g1");
        assert_eq!(alert.edit_uri(), "#alert/edit/a1");
    }

    #[test]
    fn test_decode_missing_optional_fields() {
        let alert = Alert::decode(json!({"id": "a2", "name": "bare"})).unwrap();
        assert_eq!(alert.comment, "");
        assert_eq!(alert.query, "");
    }

    #[test]
    fn test_decode_null_fields_as_empty() {
        let alert = Alert::decode(json!({
            "id": "a1",
            "name": null,
            "query": "cpu > 90",
            "checkInterval": null,
            "comment": null,
            "notificationGroupId": null
        }))
        .unwrap();

        assert_eq!(alert.name, "");
        assert_eq!(alert.query, "cpu > 90");
        assert_eq!(alert.comment, "");
        assert_eq!(alert.notification_group_id, "");
    }

    #[test]
    fn test_decode_without_id_fails() {
        assert!(Alert::decode(json!({"name": "nameless"})).is_err());
        assert!(Alert::decode(json!({"id": null, "name": "nameless"})).is_err());
    }

    #[test]
    fn test_encode_uses_wire_names() {
        let alert = Alert {
            id: "a3".into(),
            check_interval: "PT5M".into(),
            notification_group_id: "g9".into(),
            ..Default::default()
        };

        let value = alert.encode().unwrap();
        assert_eq!(value["checkInterval"], "PT5M");
        assert_eq!(value["notificationGroupId"], "g9");
        assert!(value.get("editUri").is_none());
    }
}

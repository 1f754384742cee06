use crate::{
    entity::{Entity, EntityKind, null_as_default, require_id},
    error::Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A generated report.
///
/// Only the identifier is interpreted. Every other field is carried through
/// untouched so a report can be displayed and written back without loss.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Report {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Report {
    /// Look up a pass-through field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Entity for Report {
    const KIND: EntityKind = EntityKind::Report;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn decode(value: Value) -> Result<Self> {
        require_id(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_pass_through() {
        let input = json!({
            "id": "r1",
            "name": "weekly",
            "schedule": {"period": "P1W"},
            "recipients": [1, 2]
        });

        let report = Report::decode(input.clone()).unwrap();
        assert_eq!(report.field("name"), Some(&json!("weekly")));
        assert_eq!(report.edit_uri(), "#report/edit/r1");
        assert_eq!(report.encode().unwrap(), input);
    }

    #[test]
    fn test_null_fields_are_kept() {
        let input = json!({"id": "r2", "owner": null});

        let report = Report::decode(input.clone()).unwrap();
        assert_eq!(report.field("owner"), Some(&Value::Null));
        assert_eq!(report.encode().unwrap(), input);
        assert!(Report::decode(json!({"id": null})).is_err());
    }
}

use crate::{
    entity::{Entity, EntityKind, null_as_default, require_id},
    error::{PortalError, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single notification channel inside a group.
///
/// The tag is fixed when the value is built; each variant only carries its
/// own payload field.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Recipient {
    Email {
        address: String,
    },
    WebHook {
        address: String,
    },
    PagerDuty {
        #[serde(rename = "pagerDutyEndpointName")]
        pager_duty_endpoint_name: String,
    },
}

impl Recipient {
    /// Decode one recipient payload, dispatching on its `type` discriminator
    pub fn decode(payload: Value) -> Result<Self> {
        let mut fields = match payload {
            Value::Object(fields) => fields,
            other => {
                return Err(PortalError::Decode(format!(
                    "recipient must be an object, got {other}"
                )));
            }
        };

        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => return Err(PortalError::UnrecognizedVariant(other.to_string())),
            None => return Err(PortalError::Decode("recipient is missing 'type'".into())),
        };

        match kind.as_str() {
            "email" => Ok(Recipient::Email {
                address: take_string(&mut fields, "address")?,
            }),
            "webhook" => Ok(Recipient::WebHook {
                address: take_string(&mut fields, "address")?,
            }),
            "pagerduty" => Ok(Recipient::PagerDuty {
                pager_duty_endpoint_name: take_string(&mut fields, "pagerDutyEndpointName")?,
            }),
            _ => Err(PortalError::UnrecognizedVariant(kind)),
        }
    }

    /// Wire discriminator of this variant
    pub fn kind(&self) -> &'static str {
        match self {
            Recipient::Email { .. } => "email",
            Recipient::WebHook { .. } => "webhook",
            Recipient::PagerDuty { .. } => "pagerduty",
        }
    }

    /// Where notifications for this recipient are delivered
    pub fn target(&self) -> &str {
        match self {
            Recipient::Email { address } | Recipient::WebHook { address } => address,
            Recipient::PagerDuty {
                pager_duty_endpoint_name,
            } => pager_duty_endpoint_name,
        }
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Result<String> {
    match fields.remove(key) {
        Some(Value::String(value)) => Ok(value),
        _ => Err(PortalError::Decode(format!(
            "recipient field '{key}' is missing or not a string"
        ))),
    }
}

/// A named, ordered fan-out of recipients. Entry order is the notification order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationGroup {
    pub id: String,
    pub name: String,
    #[serde(rename = "recipients")]
    pub entries: Vec<Recipient>,
}

#[derive(Deserialize)]
struct RawNotificationGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, alias = "entries", deserialize_with = "null_as_default")]
    recipients: Vec<Value>,
}

impl Entity for NotificationGroup {
    const KIND: EntityKind = EntityKind::NotificationGroup;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn decode(value: Value) -> Result<Self> {
        let raw: RawNotificationGroup = serde_json::from_value(value)?;

        let entries = raw
            .recipients
            .into_iter()
            .map(Recipient::decode)
            .collect::<Result<Vec<_>>>()?;

        require_id(NotificationGroup {
            id: raw.id,
            name: raw.name,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_each_variant() {
        assert_eq!(
            Recipient::decode(json!({"type": "email", "address": "a@x.com"})).unwrap(),
            Recipient::Email {
                address: "a@x.com".into()
            }
        );
        assert_eq!(
            Recipient::decode(json!({"type": "webhook", "address": "http://y"})).unwrap(),
            Recipient::WebHook {
                address: "http://y".into()
            }
        );
        assert_eq!(
            Recipient::decode(json!({"type": "pagerduty", "pagerDutyEndpointName": "ops"}))
                .unwrap(),
            Recipient::PagerDuty {
                pager_duty_endpoint_name: "ops".into()
            }
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = Recipient::decode(json!({"type": "sms", "address": "+1555"})).unwrap_err();
        assert_eq!(err, PortalError::UnrecognizedVariant("sms".into()));

        let err = Recipient::decode(json!({"type": 7})).unwrap_err();
        assert!(matches!(err, PortalError::UnrecognizedVariant(_)));
    }

    #[test]
    fn test_missing_variant_field_is_rejected() {
        let err = Recipient::decode(json!({"type": "pagerduty", "address": "x"})).unwrap_err();
        assert!(matches!(err, PortalError::Decode(_)));
    }

    #[test]
    fn test_group_decode_preserves_order() {
        let group = NotificationGroup::decode(json!({
            "id": "g1",
            "name": "oncall",
            "recipients": [
                {"type": "email", "address": "a@x.com"},
                {"type": "webhook", "address": "http://y"}
            ]
        }))
        .unwrap();

        assert_eq!(
            group.entries,
            vec![
                Recipient::Email {
                    address: "a@x.com".into()
                },
                Recipient::WebHook {
                    address: "http://y".into()
                },
            ]
        );
        assert_eq!(group.edit_uri(), "#notificationgroup/edit/g1");
    }

    #[test]
    fn test_group_with_null_name_and_recipients() {
        let group = NotificationGroup::decode(json!({
            "id": "g3",
            "name": null,
            "recipients": null
        }))
        .unwrap();

        assert_eq!(group.name, "");
        assert!(group.entries.is_empty());
        assert_eq!(group.encode().unwrap(), json!({"id": "g3", "name": "", "recipients": []}));
    }

    #[test]
    fn test_group_with_unknown_recipient_fails_whole_decode() {
        let err = NotificationGroup::decode(json!({
            "id": "g1",
            "name": "oncall",
            "recipients": [
                {"type": "email", "address": "a@x.com"},
                {"type": "carrier-pigeon", "address": "roof"}
            ]
        }))
        .unwrap_err();

        assert_eq!(err, PortalError::UnrecognizedVariant("carrier-pigeon".into()));
    }

    #[test]
    fn test_group_round_trip_keeps_order_and_tags() {
        let input = json!({
            "id": "g2",
            "name": "escalation",
            "recipients": [
                {"type": "pagerduty", "pagerDutyEndpointName": "primary"},
                {"type": "email", "address": "b@x.com"},
                {"type": "webhook", "address": "http://z"}
            ]
        });

        let group = NotificationGroup::decode(input.clone()).unwrap();
        assert_eq!(group.encode().unwrap(), input);
        assert_eq!(group.entries[0].kind(), "pagerduty");
        assert_eq!(group.entries[0].target(), "primary");
    }
}

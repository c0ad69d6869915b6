//! Item entity and its create/update payloads.

use crate::error::AppError;
use crate::service::{RequestValidator, ValidationRule};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Field rules shared by create (all enforced) and update (present fields only).
pub const ITEM_RULES: &[(&str, ValidationRule)] = &[
    (
        "name",
        ValidationRule {
            required: true,
            nullable: false,
            min_length: Some(1),
            max_length: Some(NAME_MAX_LEN),
        },
    ),
    (
        "description",
        ValidationRule {
            required: false,
            nullable: true,
            min_length: None,
            max_length: Some(DESCRIPTION_MAX_LEN),
        },
    ),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Fresh item with an in-process id; used by stores that do not assign keys.
    pub fn new(input: ItemCreate) -> Self {
        let now = now_micros();
        Item {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the supplied fields and bump `updated_at`.
    pub fn apply(&mut self, update: ItemUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_at = next_update_timestamp(self.updated_at);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemCreate {
    #[schema(min_length = 1, max_length = 100)]
    pub name: String,
    #[schema(max_length = 500)]
    #[serde(default)]
    pub description: Option<String>,
}

impl ItemCreate {
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let body = body_to_map(body)?;
        RequestValidator::validate(&body, ITEM_RULES)?;
        Ok(ItemCreate {
            name: string_field(&body, "name").unwrap_or_default(),
            description: string_field(&body, "description"),
        })
    }
}

/// Partial update. `description: Some(None)` clears the description.
#[derive(Clone, Debug, Default, PartialEq, Eq, ToSchema)]
pub struct ItemUpdate {
    #[schema(min_length = 1, max_length = 100)]
    pub name: Option<String>,
    #[schema(value_type = Option<String>, max_length = 500)]
    pub description: Option<Option<String>>,
}

impl ItemUpdate {
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let body = body_to_map(body)?;
        RequestValidator::validate_partial(&body, ITEM_RULES)?;
        Ok(ItemUpdate {
            name: string_field(&body, "name"),
            description: body
                .contains_key("description")
                .then(|| string_field(&body, "description")),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::invalid("body", "must be a JSON object")),
    }
}

fn string_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Current time at the precision PostgreSQL keeps (microseconds).
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// `updated_at` for the next write: now, but strictly after `previous`.
pub fn next_update_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_accepts_minimal_body() {
        let c = ItemCreate::from_body(json!({"name": "Minimal Item"})).unwrap();
        assert_eq!(c.name, "Minimal Item");
        assert_eq!(c.description, None);
    }

    #[test]
    fn create_reports_every_bad_field() {
        let err = ItemCreate::from_body(json!({"description": "x".repeat(501)})).unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["name", "description"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn create_rejects_empty_and_long_names() {
        assert!(ItemCreate::from_body(json!({"name": ""})).is_err());
        assert!(ItemCreate::from_body(json!({"name": "x".repeat(101)})).is_err());
        assert!(ItemCreate::from_body(json!({"name": "x".repeat(100)})).is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(ItemCreate::from_body(json!({"name": "é".repeat(100)})).is_ok());
    }

    #[test]
    fn create_rejects_non_object_body() {
        assert!(matches!(
            ItemCreate::from_body(json!(["name"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_distinguishes_absent_and_null_description() {
        let u = ItemUpdate::from_body(json!({"name": "n"})).unwrap();
        assert_eq!(u.description, None);
        let u = ItemUpdate::from_body(json!({"description": null})).unwrap();
        assert_eq!(u.description, Some(None));
        assert!(!u.is_empty());
        assert!(ItemUpdate::from_body(json!({})).unwrap().is_empty());
    }

    #[test]
    fn update_rejects_null_name() {
        assert!(ItemUpdate::from_body(json!({"name": null})).is_err());
    }

    #[test]
    fn apply_changes_only_supplied_fields_and_advances_timestamp() {
        let mut item = Item::new(ItemCreate {
            name: "Test Item".into(),
            description: Some("keep me".into()),
        });
        let before = item.clone();
        item.apply(ItemUpdate {
            name: Some("Renamed".into()),
            description: None,
        });
        assert_eq!(item.id, before.id);
        assert_eq!(item.name, "Renamed");
        assert_eq!(item.description.as_deref(), Some("keep me"));
        assert_eq!(item.created_at, before.created_at);
        assert!(item.updated_at > before.updated_at);
    }

    #[test]
    fn next_timestamp_is_strictly_later_even_for_future_input() {
        let future = now_micros() + Duration::seconds(60);
        assert_eq!(next_update_timestamp(future), future + Duration::microseconds(1));
    }
}

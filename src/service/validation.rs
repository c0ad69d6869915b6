//! Request validation from per-field rules.

use crate::error::{AppError, FieldError};
use serde_json::{Map, Value};

/// Constraints for one string field of a JSON body.
#[derive(Clone, Copy, Debug)]
pub struct ValidationRule {
    pub required: bool,
    pub nullable: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against rules. All required fields must be present.
    pub fn validate(
        body: &Map<String, Value>,
        rules: &[(&str, ValidationRule)],
    ) -> Result<(), AppError> {
        let mut errors = Vec::new();
        for (field, rule) in rules {
            match body.get(*field) {
                None if rule.required => errors.push(FieldError::new(*field, "field required")),
                None => {}
                Some(v) => validate_field(field, v, rule, &mut errors),
            }
        }
        finish(errors)
    }

    /// Validate only the fields present in body (for PUT). Required is not enforced for missing fields.
    pub fn validate_partial(
        body: &Map<String, Value>,
        rules: &[(&str, ValidationRule)],
    ) -> Result<(), AppError> {
        let mut errors = Vec::new();
        for (field, rule) in rules {
            if let Some(v) = body.get(*field) {
                validate_field(field, v, rule, &mut errors);
            }
        }
        finish(errors)
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn validate_field(field: &str, v: &Value, rule: &ValidationRule, errors: &mut Vec<FieldError>) {
    let s = match v {
        Value::Null if rule.nullable => return,
        Value::Null => {
            errors.push(FieldError::new(field, "must not be null"));
            return;
        }
        Value::String(s) => s,
        _ => {
            errors.push(FieldError::new(field, "must be a string"));
            return;
        }
    };
    let len = s.chars().count();
    if let Some(min) = rule.min_length {
        if len < min {
            errors.push(FieldError::new(
                field,
                format!("must be at least {} characters", min),
            ));
        }
    }
    if let Some(max) = rule.max_length {
        if len > max {
            errors.push(FieldError::new(
                field,
                format!("must be at most {} characters", max),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RULES: &[(&str, ValidationRule)] = &[(
        "title",
        ValidationRule {
            required: true,
            nullable: false,
            min_length: Some(2),
            max_length: Some(4),
        },
    )];

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn fields(err: AppError) -> Vec<FieldError> {
        match err {
            AppError::Validation(f) => f,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_field() {
        let errs = fields(RequestValidator::validate(&obj(json!({})), RULES).unwrap_err());
        assert_eq!(errs, vec![FieldError::new("title", "field required")]);
    }

    #[test]
    fn partial_skips_missing_fields() {
        assert!(RequestValidator::validate_partial(&obj(json!({})), RULES).is_ok());
    }

    #[test]
    fn bounds_and_types() {
        let errs = fields(RequestValidator::validate(&obj(json!({"title": "a"})), RULES).unwrap_err());
        assert_eq!(errs[0].message, "must be at least 2 characters");
        let errs = fields(RequestValidator::validate(&obj(json!({"title": "abcde"})), RULES).unwrap_err());
        assert_eq!(errs[0].message, "must be at most 4 characters");
        let errs = fields(RequestValidator::validate(&obj(json!({"title": 12})), RULES).unwrap_err());
        assert_eq!(errs[0].message, "must be a string");
        let errs = fields(RequestValidator::validate_partial(&obj(json!({"title": null})), RULES).unwrap_err());
        assert_eq!(errs[0].message, "must not be null");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert!(RequestValidator::validate(&obj(json!({"title": "abc", "extra": 1})), RULES).is_ok());
    }
}

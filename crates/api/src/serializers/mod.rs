//! JSON representations and request body validation.
//!
//! Each entity module provides the response shape (`*Representation`) and the
//! validators turning a request body into store input. Validation reads the
//! body field by field through [`FieldReader`], which collects every failure
//! before giving up so the client sees all of them at once.
//!
//! # Modes
//!
//! - Create and full update (PUT): fields without a default are required
//! - Partial update (PATCH): only fields present in the body are checked
//!
//! Unknown fields, and `id`, are ignored.

pub mod cart;
pub mod cart_item;
pub mod item;
pub mod user;

pub use cart::CartRepresentation;
pub use cart_item::CartItemRepresentation;
pub use item::ItemRepresentation;
pub use user::UserRepresentation;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use shopping_cart_core::{FieldErrors, Price, Quantity, Username};

use crate::error::ApiError;

/// A JSON request body.
pub type Body = Map<String, Value>;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NOT_A_NUMBER: &str = "A valid number is required.";

/// Reads typed fields out of a request body, collecting errors per field.
#[derive(Debug)]
pub struct FieldReader<'a> {
    body: &'a Body,
    partial: bool,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    /// Reader for a create or full update.
    #[must_use]
    pub fn new(body: &'a Body) -> Self {
        Self {
            body,
            partial: false,
            errors: FieldErrors::new(),
        }
    }

    /// Reader for a partial update.
    #[must_use]
    pub fn partial(body: &'a Body) -> Self {
        Self {
            body,
            partial: true,
            ..Self::new(body)
        }
    }

    /// Record a failure against `field`.
    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// The raw value of `field`, or `None` if it is absent or null.
    ///
    /// Absence is an error unless the update is partial or the field has a
    /// default. Null is always an error.
    fn value(&mut self, field: &str, has_default: bool) -> Option<&'a Value> {
        let body = self.body;
        match body.get(field) {
            None => {
                if !self.partial && !has_default {
                    self.reject(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.reject(field, NOT_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// A required text field of at most `max_length` characters.
    ///
    /// Surrounding whitespace is trimmed. Numbers are accepted and rendered as
    /// text.
    pub fn string(&mut self, field: &str, max_length: usize) -> Option<String> {
        let text = match self.value(field, false)? {
            Value::String(s) => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.reject(field, NOT_A_STRING);
                return None;
            }
        };
        if text.is_empty() {
            self.reject(field, NOT_BLANK);
            return None;
        }
        if text.chars().count() > max_length {
            self.reject(
                field,
                format!("Ensure this field has no more than {max_length} characters."),
            );
            return None;
        }
        Some(text)
    }

    /// A required username.
    pub fn username(&mut self, field: &str) -> Option<Username> {
        let text = self.string(field, Username::MAX_LENGTH)?;
        Username::parse(&text)
            .map_err(|e| self.reject(field, e.to_string()))
            .ok()
    }

    /// A required reference to another record by id.
    ///
    /// Only the shape is checked here; whether the record exists is up to the
    /// store.
    pub fn primary_key<T: From<i32>>(&mut self, field: &str) -> Option<T> {
        let value = self.value(field, false)?;
        match parse_primary_key(value) {
            PrimaryKey::Valid(id) => Some(T::from(id)),
            PrimaryKey::OutOfRange(raw) => {
                self.reject(field, format!("Invalid pk \"{raw}\" - object does not exist."));
                None
            }
            PrimaryKey::WrongType(type_name) => {
                self.reject(
                    field,
                    format!("Incorrect type. Expected pk value, received {type_name}."),
                );
                None
            }
        }
    }

    /// A required price.
    pub fn price(&mut self, field: &str) -> Option<Price> {
        let value = self.value(field, false)?;
        let Some(amount) = parse_decimal(value) else {
            self.reject(field, NOT_A_NUMBER);
            return None;
        };
        Price::parse(amount)
            .map_err(|e| self.reject(field, e.to_string()))
            .ok()
    }

    /// An optional quantity; absence leaves the default (or current) value.
    pub fn quantity(&mut self, field: &str) -> Option<Quantity> {
        let value = self.value(field, true)?;
        let Some(n) = parse_integer(value) else {
            self.reject(field, NOT_AN_INTEGER);
            return None;
        };
        Quantity::new(n)
            .map_err(|e| self.reject(field, e.to_string()))
            .ok()
    }

    /// Finish validation.
    ///
    /// `build` assembles the validated input from the fields read so far; it
    /// is only consulted when no field failed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Invalid` with every recorded failure.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ApiError> {
        if !self.errors.is_empty() {
            return Err(ApiError::Invalid(self.errors));
        }
        build().ok_or(ApiError::Invalid(self.errors))
    }
}

enum PrimaryKey {
    Valid(i32),
    OutOfRange(String),
    WrongType(&'static str),
}

fn parse_primary_key(value: &Value) -> PrimaryKey {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i)
                    .map_or_else(|_| PrimaryKey::OutOfRange(n.to_string()), PrimaryKey::Valid)
            } else if n.is_u64() {
                PrimaryKey::OutOfRange(n.to_string())
            } else {
                PrimaryKey::WrongType("float")
            }
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => i32::try_from(i)
                .map_or_else(|_| PrimaryKey::OutOfRange(s.clone()), PrimaryKey::Valid),
            Err(_) => PrimaryKey::WrongType("str"),
        },
        other => PrimaryKey::WrongType(type_name(other)),
    }
}

/// Name of a JSON value's type as reported in error messages.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Decimal from a JSON number or numeric string.
fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Integer from a JSON number or numeric string. Integral floats (`2.0`)
/// are accepted.
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let decimal = Decimal::from_str(&n.to_string()).ok()?;
            integral(decimal)
        }),
        Value::String(s) => {
            let text = s.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| Decimal::from_str(text).ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(decimal: Decimal) -> Option<i64> {
    if decimal.fract().is_zero() {
        i64::try_from(decimal.trunc()).ok()
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use shopping_cart_core::ItemId;

    use super::*;

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn errors(reader: FieldReader<'_>) -> FieldErrors {
        match reader.finish(|| Some(())) {
            Err(ApiError::Invalid(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_required_unless_partial() {
        let data = body(json!({}));
        let mut reader = FieldReader::new(&data);
        assert!(reader.string("name", 200).is_none());
        assert_eq!(errors(reader).get("name").unwrap(), [REQUIRED]);

        let mut reader = FieldReader::partial(&data);
        assert!(reader.string("name", 200).is_none());
        assert!(reader.finish(|| Some(())).is_ok());
    }

    #[test]
    fn test_null_rejected_even_when_partial() {
        let data = body(json!({ "name": null }));
        let mut reader = FieldReader::partial(&data);
        reader.string("name", 200);
        assert_eq!(errors(reader).get("name").unwrap(), [NOT_NULL]);
    }

    #[test]
    fn test_string_trimmed_and_limited() {
        let data = body(json!({
            "a": "  item1 ", "b": "   ", "c": "x".repeat(201), "d": 7, "e": [],
        }));
        let mut reader = FieldReader::new(&data);
        assert_eq!(reader.string("a", 200).unwrap(), "item1");
        assert!(reader.string("b", 200).is_none());
        assert!(reader.string("c", 200).is_none());
        assert_eq!(reader.string("d", 200).unwrap(), "7");
        assert!(reader.string("e", 200).is_none());

        let errors = errors(reader);
        assert_eq!(errors.get("b").unwrap(), [NOT_BLANK]);
        assert_eq!(
            errors.get("c").unwrap(),
            ["Ensure this field has no more than 200 characters."]
        );
        assert_eq!(errors.get("e").unwrap(), [NOT_A_STRING]);
    }

    #[test]
    fn test_primary_key_shapes() {
        let data = body(json!({
            "a": 3, "b": "4", "c": "abc", "d": true, "e": 1.5, "f": 4_294_967_296_i64,
        }));
        let mut reader = FieldReader::new(&data);
        assert_eq!(reader.primary_key::<ItemId>("a"), Some(ItemId::new(3)));
        assert_eq!(reader.primary_key::<ItemId>("b"), Some(ItemId::new(4)));
        assert!(reader.primary_key::<ItemId>("c").is_none());
        assert!(reader.primary_key::<ItemId>("d").is_none());
        assert!(reader.primary_key::<ItemId>("e").is_none());
        assert!(reader.primary_key::<ItemId>("f").is_none());

        let errors = errors(reader);
        assert_eq!(
            errors.get("c").unwrap(),
            ["Incorrect type. Expected pk value, received str."]
        );
        assert_eq!(
            errors.get("d").unwrap(),
            ["Incorrect type. Expected pk value, received bool."]
        );
        assert_eq!(
            errors.get("e").unwrap(),
            ["Incorrect type. Expected pk value, received float."]
        );
        assert_eq!(
            errors.get("f").unwrap(),
            ["Invalid pk \"4294967296\" - object does not exist."]
        );
    }

    #[test]
    fn test_price_from_number_or_string() {
        let data = body(json!({ "a": 10.5, "b": "20", "c": "ten", "d": "1234.567", "e": -1 }));
        let mut reader = FieldReader::new(&data);
        assert_eq!(reader.price("a").unwrap().to_string(), "10.50");
        assert_eq!(reader.price("b").unwrap().to_string(), "20.00");
        assert!(reader.price("c").is_none());
        assert!(reader.price("d").is_none());
        assert!(reader.price("e").is_none());

        let errors = errors(reader);
        assert_eq!(errors.get("c").unwrap(), [NOT_A_NUMBER]);
        assert_eq!(
            errors.get("d").unwrap(),
            ["Ensure that there are no more than 6 digits in total."]
        );
        assert_eq!(
            errors.get("e").unwrap(),
            ["Ensure this value is greater than or equal to 0."]
        );
    }

    #[test]
    fn test_quantity_has_default() {
        let data = body(json!({ "b": "3", "c": 2.0, "d": 0, "e": "many" }));
        let mut reader = FieldReader::new(&data);
        assert!(reader.quantity("a").is_none());
        assert_eq!(reader.quantity("b").unwrap().get(), 3);
        assert_eq!(reader.quantity("c").unwrap().get(), 2);
        assert!(reader.quantity("d").is_none());
        assert!(reader.quantity("e").is_none());

        let errors = errors(reader);
        assert!(errors.get("a").is_none());
        assert_eq!(
            errors.get("d").unwrap(),
            ["Ensure this value is greater than or equal to 1."]
        );
        assert_eq!(errors.get("e").unwrap(), [NOT_AN_INTEGER]);
    }

    #[test]
    fn test_username_rules() {
        let data = body(json!({ "a": "first.last+shop@home", "b": "with space" }));
        let mut reader = FieldReader::new(&data);
        assert!(reader.username("a").is_some());
        assert!(reader.username("b").is_none());
        assert_eq!(
            errors(reader).get("b").unwrap(),
            ["Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."]
        );
    }
}

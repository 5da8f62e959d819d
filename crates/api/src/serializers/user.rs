//! User representation and input validation.

use serde::Serialize;

use shopping_cart_core::{UserId, Username};

use super::{Body, FieldReader};
use crate::error::ApiError;
use crate::models::{NewUser, User, UserChanges};
use crate::services::password::hash_password;

/// Maximum accepted password length, before hashing.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// A user as rendered to clients. The password never appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRepresentation {
    pub id: UserId,
    pub username: Username,
}

impl From<User> for UserRepresentation {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

fn hash(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Validate a create body and hash its password.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_new(body: &Body) -> Result<NewUser, ApiError> {
    let mut reader = FieldReader::new(body);
    let username = reader.username("username");
    let password = reader.string("password", PASSWORD_MAX_LENGTH);
    let (username, password) = reader.finish(|| Some((username?, password?)))?;

    Ok(NewUser {
        username,
        password_hash: hash(&password)?,
    })
}

/// Validate an update body; a new password is hashed too.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_changes(body: &Body, partial: bool) -> Result<UserChanges, ApiError> {
    let mut reader = if partial {
        FieldReader::partial(body)
    } else {
        FieldReader::new(body)
    };
    let username = reader.username("username");
    let password = reader.string("password", PASSWORD_MAX_LENGTH);
    reader.finish(|| Some(()))?;

    Ok(UserChanges {
        username,
        password_hash: password.as_deref().map(hash).transpose()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::services::password::verify_password;

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_representation_omits_password() {
        let user = User {
            id: UserId::new(1),
            username: Username::parse("testuser1").unwrap(),
            password_hash: "$argon2id$secret".to_owned(),
        };
        let json = serde_json::to_value(UserRepresentation::from(user)).unwrap();
        assert_eq!(json, json!({ "id": 1, "username": "testuser1" }));
    }

    #[test]
    fn test_validate_new_hashes_password() {
        let new = validate_new(&body(json!({
            "id": 99,
            "username": "testuser3",
            "password": "testpassword3",
        })))
        .unwrap();
        assert_eq!(new.username.as_str(), "testuser3");
        assert_ne!(new.password_hash, "testpassword3");
        assert!(verify_password("testpassword3", &new.password_hash));
    }

    #[test]
    fn test_validate_new_reports_every_field() {
        let Err(ApiError::Invalid(errors)) = validate_new(&body(json!({}))) else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get("username").unwrap(), ["This field is required."]);
        assert_eq!(errors.get("password").unwrap(), ["This field is required."]);
    }

    #[test]
    fn test_partial_changes_only_present_fields() {
        let changes = validate_changes(&body(json!({ "password": "newpassword" })), true).unwrap();
        assert!(changes.username.is_none());
        assert!(verify_password("newpassword", &changes.password_hash.unwrap()));
    }

    #[test]
    fn test_full_update_requires_password() {
        let result = validate_changes(&body(json!({ "username": "renamed" })), false);
        let Err(ApiError::Invalid(errors)) = result else {
            panic!("expected validation failure");
        };
        assert!(errors.get("username").is_none());
        assert_eq!(errors.get("password").unwrap(), ["This field is required."]);
    }
}

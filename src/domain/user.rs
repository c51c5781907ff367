//! The user entity.

use serde::{Deserialize, Deserializer, Serialize};

/// A user record.
///
/// `id` is assigned by the store on insert. Request bodies may omit it (and
/// any profile field); unknown fields are ignored and an explicit `null`
/// leaves a field at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier (0 until inserted).
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,

    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl User {
    /// Create a new, not yet stored user.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: None,
        }
    }

    /// Set the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Return a copy of this user carrying the given id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let user: User = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
        assert_eq!(user.id, 0);
        assert_eq!(user.name, "Alice");
        assert!(user.email.is_none());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let user: User = serde_json::from_str(r#"{"name":"Bob","age":42}"#).unwrap();
        assert_eq!(user, User::new("Bob"));
    }

    #[test]
    fn test_absent_email_not_serialized() {
        let json = serde_json::to_string(&User::new("Alice").with_id(1)).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Alice"}"#);
    }

    #[test]
    fn test_null_fields_default() {
        let user: User =
            serde_json::from_str(r#"{"id":null,"name":null,"email":null}"#).unwrap();
        assert_eq!(user, User::default());

        let user: User = serde_json::from_str(r#"{"id":null,"name":"A"}"#).unwrap();
        assert_eq!(user, User::new("A"));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(serde_json::from_str::<User>(r#"{"name":5}"#).is_err());
        assert!(serde_json::from_str::<User>(r#"["Alice"]"#).is_err());
    }
}

//! Wire-level message definitions for the WebSocket adapter.

use serde::Serialize;

use crate::domain::User;

/// One user row in the broadcast listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: String,
}

impl From<&User> for UserListEntry {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.display_name.as_ref().map(ToString::to_string),
            status: user.status.to_string(),
        }
    }
}

/// Periodic user-list broadcast payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListMessage {
    /// Discriminator for clients multiplexing message kinds.
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub count: usize,
    pub users: Vec<UserListEntry>,
}

impl UserListMessage {
    /// Build the broadcast payload from a user snapshot.
    pub fn new(users: &[User]) -> Self {
        Self {
            kind: "users",
            count: users.len(),
            users: users.iter().map(UserListEntry::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{EmailAddress, UserId};
    use serde_json::Value;

    #[test]
    fn broadcast_payload_is_camel_case_with_type_tag() {
        let user = User::builder(
            UserId::random(),
            EmailAddress::new("ada@example.com").expect("email"),
        )
        .build();
        let message = UserListMessage::new(&[user]);

        let json = serde_json::to_value(&message).expect("serialise");
        assert_eq!(json.get("type").and_then(Value::as_str), Some("users"));
        assert_eq!(json.get("count").and_then(Value::as_u64), Some(1));
        let first = &json.get("users").and_then(Value::as_array).expect("users")[0];
        assert_eq!(first.get("status").and_then(Value::as_str), Some("active"));
        assert!(first.get("name").is_none());
    }
}

//! Users known to the server.

use super::json;
use crate::error::{ParsingError, Result};
use serde_json::Value;
use url::Url;

/// A single user
#[derive(Clone, Debug)]
pub struct User {
    /// The user's full name
    pub full_name: String,
    /// The user's absolute URL
    pub absolute_url: Option<Url>,
    /// Free-form description
    pub description: Option<String>,
}

impl User {
    fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        Ok(User {
            full_name: json::required_str(object, "fullName")?.to_string(),
            absolute_url: json::optional_url(object, "absoluteUrl"),
            description: json::optional_str(object, "description"),
        })
    }
}

/// The user list payload
///
/// The server wraps each user in an envelope carrying activity metadata; only
/// the user object itself is kept here.
#[derive(Clone, Debug)]
pub struct UserList {
    /// All known users
    pub users: Vec<User>,
}

impl UserList {
    /// Loose-decode a user list payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let entries = json::required(object, "users")?
            .as_array()
            .ok_or(ParsingError::DataNotCorrectFormat)?;

        let users = entries
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| entry.get("user"))
            .map(User::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(UserList { users })
    }
}

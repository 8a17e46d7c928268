//! The CSRF crumb issued by the server.

use serde::Deserialize;

/// A short-lived CSRF token for state-changing requests
///
/// The server dictates both the token value and the field name under which it
/// must be sent back. For the endpoints this crate posts to, the crumb travels
/// as a URL query parameter named after `request_field`, not as an HTTP
/// header.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Crumb {
    /// The token value
    pub crumb: String,
    /// The field name the server expects the token under
    #[serde(rename = "crumbRequestField")]
    pub request_field: String,
}

//! Build artifacts: remote file descriptors with lazily-discovered sizes.

use super::json;
use serde_json::Value;
use url::Url;

/// A file produced by a build
///
/// The size starts out unknown and is discovered through a metadata-only HEAD
/// probe via
/// [`JenkinsClient::set_size_for_artifact`](crate::client::JenkinsClient::set_size_for_artifact),
/// never by downloading the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Download URL of the artifact
    pub url: Url,
    /// The artifact's file name
    pub filename: String,
    /// Path of the artifact relative to the build
    pub relative_path: String,
    /// Size in bytes, once probed
    pub size: Option<u64>,
}

impl Artifact {
    /// Parse an artifact entry from a build payload.
    ///
    /// Entries missing either name or path are dropped rather than failing
    /// the surrounding build decode.
    pub(crate) fn parse(value: &Value, build_url: &Url) -> Option<Self> {
        let object = value.as_object()?;
        let filename = json::optional_str(object, "fileName")?;
        let relative_path = json::optional_str(object, "relativePath")?;

        let mut url = build_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("artifact")
            .extend(relative_path.split('/'));

        Some(Artifact {
            url,
            filename,
            relative_path,
            size: None,
        })
    }
}

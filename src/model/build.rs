//! Builds and the strictly-decoded build-adjacent payloads.

use super::json;
use super::Artifact;
use crate::endpoints;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// A single build of a job
#[derive(Clone, Debug)]
pub struct Build {
    /// The build's URL
    pub url: Url,
    /// The build number, when reported
    pub number: Option<u64>,
    /// The server-assigned build id
    pub id: Option<String>,
    /// Full display name, e.g. "my-job #42"
    pub full_display_name: Option<String>,
    /// Result string such as "SUCCESS" or "FAILURE"; `None` while running
    pub result: Option<String>,
    /// When the build started
    pub timestamp: Option<DateTime<Utc>>,
    /// Build duration in milliseconds
    pub duration: Option<u64>,
    /// Whether the build is still running
    pub building: bool,
    /// Artifacts the build produced
    pub artifacts: Vec<Artifact>,
}

impl Build {
    /// Loose-decode a build payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let url = json::required_url(object, "url")?;
        let artifacts = json::array_or_empty(object, "artifacts")
            .iter()
            .filter_map(|artifact| Artifact::parse(artifact, &url))
            .collect();

        Ok(Build {
            number: json::optional_u64(object, "number"),
            id: json::optional_str(object, "id"),
            full_display_name: json::optional_str(object, "fullDisplayName"),
            result: json::optional_str(object, "result"),
            timestamp: json::optional_timestamp(object, "timestamp"),
            duration: json::optional_u64(object, "duration"),
            building: json::optional_bool(object, "building").unwrap_or(false),
            artifacts,
            url,
        })
    }

    /// Fill in fields from the full single-build payload.
    pub fn add_additional_fields(&mut self, value: &Value) -> Result<()> {
        let parsed = Build::parse(value)?;
        if parsed.number.is_some() {
            self.number = parsed.number;
        }
        if parsed.id.is_some() {
            self.id = parsed.id;
        }
        if parsed.full_display_name.is_some() {
            self.full_display_name = parsed.full_display_name;
        }
        if parsed.result.is_some() {
            self.result = parsed.result;
        }
        if parsed.timestamp.is_some() {
            self.timestamp = parsed.timestamp;
        }
        if parsed.duration.is_some() {
            self.duration = parsed.duration;
        }
        self.building = parsed.building;
        if !parsed.artifacts.is_empty() {
            self.artifacts = parsed.artifacts;
        }
        Ok(())
    }

    /// The URL of this build's console text output.
    pub fn console_output_url(&self) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoints::CONSOLE_OUTPUT);
        }
        url
    }
}

/// A single entry of a job's build-id list
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BuildId {
    /// The server-assigned build id
    pub id: String,
}

/// The strictly-decoded build-id list of a job
#[derive(Clone, Debug, Deserialize)]
pub struct JobBuildIds {
    /// Ids of all builds, newest first as the server reports them
    pub builds: Vec<BuildId>,
}

/// The strictly-decoded quieting-down status of a server
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct QuietingDown {
    /// Whether the server is refusing new builds while existing ones drain
    #[serde(rename = "quietingDown")]
    pub quieting_down: bool,
}

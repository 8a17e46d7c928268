//! Jobs, job lists and the server's "color" status indicator.

use super::json;
use super::{Build, Parameter};
use crate::error::{ParsingError, Result};
use serde_json::Value;
use url::Url;

/// The color of a job, indicating its status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JenkinsColor {
    /// Last build succeeded
    Blue,
    /// Last build failed
    Red,
    /// Last build was unstable
    Yellow,
    /// Job is disabled
    Disabled,
    /// Last build was aborted
    Aborted,
    /// Job has never been built
    NotBuilt,
    /// Succeeding job with a build in progress
    BlueAnimated,
    /// Failing job with a build in progress
    RedAnimated,
    /// Unstable job with a build in progress
    YellowAnimated,
    /// Disabled job with a build in progress
    DisabledAnimated,
    /// Aborted job with a build in progress
    AbortedAnimated,
    /// Never-built job with a build in progress
    NotBuiltAnimated,
    /// Not a job at all but a folder of jobs
    Folder,
}

impl JenkinsColor {
    /// Parse the server's color string; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "blue" => Some(JenkinsColor::Blue),
            "red" => Some(JenkinsColor::Red),
            "yellow" => Some(JenkinsColor::Yellow),
            "disabled" => Some(JenkinsColor::Disabled),
            "aborted" => Some(JenkinsColor::Aborted),
            "notbuilt" => Some(JenkinsColor::NotBuilt),
            "blue_anime" => Some(JenkinsColor::BlueAnimated),
            "red_anime" => Some(JenkinsColor::RedAnimated),
            "yellow_anime" => Some(JenkinsColor::YellowAnimated),
            "disabled_anime" => Some(JenkinsColor::DisabledAnimated),
            "aborted_anime" => Some(JenkinsColor::AbortedAnimated),
            "notbuilt_anime" => Some(JenkinsColor::NotBuiltAnimated),
            "folder" => Some(JenkinsColor::Folder),
            _ => None,
        }
    }

    /// Whether a build is currently running
    pub fn is_animated(self) -> bool {
        matches!(
            self,
            JenkinsColor::BlueAnimated
                | JenkinsColor::RedAnimated
                | JenkinsColor::YellowAnimated
                | JenkinsColor::DisabledAnimated
                | JenkinsColor::AbortedAnimated
                | JenkinsColor::NotBuiltAnimated
        )
    }

    /// Whether the "job" is actually a folder
    pub fn is_folder(self) -> bool {
        self == JenkinsColor::Folder
    }
}

/// A single health report entry for a job
#[derive(Clone, Debug, PartialEq)]
pub struct HealthReport {
    /// Human-readable health description
    pub description: Option<String>,
    /// Health score, 0 to 100
    pub score: Option<u64>,
}

impl HealthReport {
    fn parse(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(HealthReport {
            description: json::optional_str(object, "description"),
            score: json::optional_u64(object, "score"),
        })
    }
}

/// A job on the server, possibly only partially populated
///
/// Jobs arrive in two shapes: the minimal form embedded in a job list and the
/// full form returned by the single-job endpoint. [`Job::add_additional_fields`]
/// upgrades a minimal job in place once the full payload is available.
#[derive(Clone, Debug)]
pub struct Job {
    /// The job's name
    pub name: String,
    /// The job's URL
    pub url: Url,
    /// Status color; `None` when the server reports an unknown color
    pub color: Option<JenkinsColor>,
    /// Free-form job description
    pub description: Option<String>,
    /// Health report entries
    pub health_report: Vec<HealthReport>,
    /// Builds of this job, newest first as the server reports them
    pub builds: Vec<Build>,
    /// The most recent build
    pub last_build: Option<Build>,
    /// Parameter definitions for parameterized jobs
    pub parameters: Vec<Parameter>,
}

impl Job {
    /// Parse the minimal job shape embedded in list payloads.
    pub fn parse_minimal(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        Ok(Job {
            name: json::required_str(object, "name")?.to_string(),
            url: json::required_url(object, "url")?,
            color: json::optional_str(object, "color")
                .as_deref()
                .and_then(JenkinsColor::parse),
            description: None,
            health_report: Vec::new(),
            builds: Vec::new(),
            last_build: None,
            parameters: Vec::new(),
        })
    }

    /// Parse the full job shape returned by the single-job endpoint.
    pub fn parse(value: &Value) -> Result<Self> {
        let mut job = Job::parse_minimal(value)?;
        job.add_additional_fields(value)?;
        Ok(job)
    }

    /// Fill in the fields only the full payload carries.
    ///
    /// Fields absent from the payload are left untouched, so calling this with
    /// a partial payload never erases already-known data.
    pub fn add_additional_fields(&mut self, value: &Value) -> Result<()> {
        let object = json::as_object(value)?;

        if let Some(description) = json::optional_str(object, "description") {
            self.description = Some(description);
        }
        if let Some(color) = json::optional_str(object, "color") {
            self.color = JenkinsColor::parse(&color);
        }

        let health = json::array_or_empty(object, "healthReport");
        if !health.is_empty() {
            self.health_report = health.iter().filter_map(HealthReport::parse).collect();
        }

        let builds = json::array_or_empty(object, "builds");
        if !builds.is_empty() {
            self.builds = builds
                .iter()
                .map(Build::parse)
                .collect::<Result<Vec<_>>>()?;
        }

        if let Some(last) = object.get("lastBuild").filter(|v| !v.is_null()) {
            self.last_build = Some(Build::parse(last)?);
        }

        // Parameter definitions hide inside the "property" array.
        let mut parameters = Vec::new();
        for property in json::array_or_empty(object, "property") {
            let Some(property) = property.as_object() else {
                continue;
            };
            for definition in json::array_or_empty(property, "parameterDefinitions") {
                parameters.push(Parameter::parse(definition)?);
            }
        }
        if !parameters.is_empty() {
            self.parameters = parameters;
        }

        Ok(())
    }
}

/// A named view of jobs within a job list
#[derive(Clone, Debug)]
pub struct View {
    /// The view's name
    pub name: String,
    /// The view's URL
    pub url: Url,
    /// Jobs in the view, in their minimal shape
    pub jobs: Vec<Job>,
}

impl View {
    fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        Ok(View {
            name: json::required_str(object, "name")?.to_string(),
            url: json::required_url(object, "url")?,
            jobs: json::array_or_empty(object, "jobs")
                .iter()
                .map(Job::parse_minimal)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// The job list payload, organized into views
#[derive(Clone, Debug)]
pub struct JobList {
    /// All views the server reports
    pub views: Vec<View>,
}

impl JobList {
    /// Loose-decode a job list payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let views = json::required(object, "views")?
            .as_array()
            .ok_or(ParsingError::DataNotCorrectFormat)?;
        Ok(JobList {
            views: views.iter().map(View::parse).collect::<Result<Vec<_>>>()?,
        })
    }

    /// All jobs across every view, without deduplication.
    pub fn all_jobs(&self) -> impl Iterator<Item = &Job> {
        self.views.iter().flat_map(|view| view.jobs.iter())
    }
}

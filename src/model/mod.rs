//! Domain payloads decoded from server responses.
//!
//! Two decode strategies are in use, mirroring the shape of the server's
//! payloads:
//!
//! - **Strict** (`serde` derive) for small, stable shapes: [`JobBuildIds`],
//!   [`QuietingDown`], [`Crumb`]. A decode failure maps to
//!   [`ParsingError::DataNotCorrectFormat`](crate::error::ParsingError).
//! - **Loose** (`serde_json::Value` plus manual field extraction) for the
//!   richer, partially-optional payloads: [`Job`], [`Build`], [`JobList`],
//!   [`BuildQueue`], [`ComputerList`], [`PluginList`], [`UserList`],
//!   [`TestResult`]. A non-object top level maps to
//!   [`Error::JsonParsing`](crate::error::Error); a missing required key maps
//!   to [`ParsingError::KeyMissing`](crate::error::ParsingError).

mod artifact;
mod build;
mod computer;
mod crumb;
mod favorite;
mod job;
pub(crate) mod json;
mod parameters;
mod plugin;
mod queue;
mod test_result;
mod user;


pub use artifact::Artifact;
pub use build::{Build, BuildId, JobBuildIds, QuietingDown};
pub use computer::{Computer, ComputerList};
pub use crumb::Crumb;
pub use favorite::{Favoritable, Favorite};
pub use job::{HealthReport, JenkinsColor, Job, JobList, View};
pub use parameters::{Parameter, ParameterType, ParameterValue};
pub use plugin::{Plugin, PluginDependency, PluginList};
pub use queue::{BuildQueue, QueueItem};
pub use test_result::{TestCase, TestResult, TestSuite};
pub use user::{User, UserList};

//! # butler-core
//!
//! Client engine library for driving a Jenkins build server's REST API.
//!
//! ## Design Philosophy
//!
//! butler-core is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Callback-driven** - Every network operation reports through a
//!   completion callback and hands back a controller for cancellation
//! - **Tolerant of sparse payloads** - Jenkins payloads vary wildly between
//!   versions and plugins; models loose-decode and keep what they find
//! - **Credential-safe** - Account secrets live in the platform secret
//!   store, never in the metadata files on disk
//!
//! ## Quick Start
//!
//! ```no_run
//! use butler_core::{Account, JenkinsClient, UserRequest};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut account = Account::new(Url::parse("https://jenkins.example.com/")?);
//!     account.username = Some("user".to_string());
//!     account.password = Some("secret".to_string());
//!
//!     let client = JenkinsClient::new()?;
//!     client.get_jobs(UserRequest::job_list(account, None), |result| {
//!         match result {
//!             Ok(list) => {
//!                 for job in list.all_jobs() {
//!                     println!("{}", job.name);
//!                 }
//!             }
//!             Err(e) => eprintln!("job list failed: {e}"),
//!         }
//!     });
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Accounts, their persistence and the secret store
pub mod account;
/// The network client and task orchestration
pub mod client;
/// Endpoint paths and protocol constants
pub mod endpoints;
/// Error types
pub mod error;
/// Payload models
pub mod model;
/// Logical requests and wire translation
pub mod request;

pub use account::{Account, AccountStore, FavoritesStore};
pub use client::{JenkinsClient, TaskController, TaskId};
pub use endpoints::JenkinsAction;
pub use error::{AccountError, Error, ParsingError, Result};
pub use model::{
    Artifact, Build, BuildQueue, Computer, ComputerList, Crumb, Favoritable, Favorite, HealthReport,
    JenkinsColor, Job, JobBuildIds, JobList, Parameter, ParameterType, ParameterValue, Plugin,
    PluginList, QueueItem, QuietingDown, TestCase, TestResult, TestSuite, User, UserList, View,
};
pub use request::UserRequest;

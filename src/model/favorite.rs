//! User-pinned bookmarks referencing jobs, builds or folders.

use super::{Build, Job};
use serde::{Deserialize, Serialize};
use url::Url;

/// Something that can be pinned as a favorite
///
/// A tagged union over the three pinnable kinds; each variant derives its own
/// favorite key, so two favorites of different kinds never collide even when
/// they share a URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Favoritable {
    /// A pinned job
    Job {
        /// The job's URL
        url: Url,
    },
    /// A pinned build
    Build {
        /// The build's URL
        url: Url,
    },
    /// A pinned folder of jobs
    Folder {
        /// The folder's URL
        url: Url,
    },
}

impl Favoritable {
    /// The pinnable form of a job; folders are distinguished by their color.
    pub fn for_job(job: &Job) -> Self {
        if job.color.is_some_and(|color| color.is_folder()) {
            Favoritable::Folder {
                url: job.url.clone(),
            }
        } else {
            Favoritable::Job {
                url: job.url.clone(),
            }
        }
    }

    /// The pinnable form of a build.
    pub fn for_build(build: &Build) -> Self {
        Favoritable::Build {
            url: build.url.clone(),
        }
    }

    /// The URL the favorite points at
    pub fn url(&self) -> &Url {
        match self {
            Favoritable::Job { url } | Favoritable::Build { url } | Favoritable::Folder { url } => {
                url
            }
        }
    }

    /// Stable storage key derived from kind and URL
    pub fn key(&self) -> String {
        match self {
            Favoritable::Job { url } => format!("job:{url}"),
            Favoritable::Build { url } => format!("build:{url}"),
            Favoritable::Folder { url } => format!("folder:{url}"),
        }
    }
}

/// A favorite: a pinned target plus the account it belongs to
///
/// The account is referenced by its base URL; the full account record lives
/// only in the account store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// What is pinned
    pub target: Favoritable,
    /// Base URL of the account the favorite was created under
    pub account_url: Url,
}

impl Favorite {
    /// Pin a target under an account.
    pub fn new(target: Favoritable, account_url: Url) -> Self {
        Favorite {
            target,
            account_url,
        }
    }
}

//! Network task orchestration against a Jenkins server.
//!
//! [`JenkinsClient`] issues every network task in this crate. It maintains
//! three transport configurations (ordinary reads, short-timeout account
//! verification, administrative actions), tracks which [`Account`] owns each
//! in-flight task for TLS trust decisions and busy-signaling, and maps
//! transport-level outcomes to domain results.
//!
//! Results are delivered through completion callbacks which may fire from
//! background worker threads. Callers that feed results into a presentation
//! layer must marshal them onto their own designated context; the client
//! itself never does.

mod build;
mod controller;
mod crumb;

#[cfg(test)]
mod tests;

pub use controller::{TaskController, TaskId};

use crate::account::Account;
use crate::endpoints::SUCCESS_CODES;
use crate::error::{Error, ParsingError, Result};
use crate::model::{
    Artifact, Build, BuildQueue, ComputerList, Job, JobBuildIds, JobList, PluginList, TestResult,
    UserList,
};
use crate::request::{self, UserRequest};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Timeout of the verification transport
const VERIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Which transport configuration a task runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// Ordinary reads, platform-default timeouts
    Default,
    /// Account verification only, 10-second timeout
    Verification,
    /// Administrative actions
    Action,
}

/// One transport configuration: a standard client and its trust-all twin
struct Transport {
    standard: reqwest::Client,
    insecure: reqwest::Client,
}

impl Transport {
    fn new(timeout: Option<Duration>) -> Result<Self> {
        let base = || {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            builder
        };
        Ok(Transport {
            standard: base().build()?,
            insecure: base().danger_accept_invalid_certs(true).build()?,
        })
    }
}

struct ClientInner {
    default_transport: Transport,
    verification_transport: Transport,
    action_transport: Transport,
    /// task → issuing account, for trust decisions and busy-signaling
    registry: Mutex<HashMap<TaskId, Account>>,
    active: Mutex<usize>,
    activity_tx: watch::Sender<bool>,
    next_task_id: AtomicU64,
}

impl ClientInner {
    fn transport(&self, kind: TransportKind) -> &Transport {
        match kind {
            TransportKind::Default => &self.default_transport,
            TransportKind::Verification => &self.verification_transport,
            TransportKind::Action => &self.action_transport,
        }
    }

    /// Whether a task's issuing account opted into accepting any server
    /// certificate. A registry lookup miss falls back to standard validation.
    fn trusts_all_certificates(&self, id: TaskId) -> bool {
        self.registry
            .lock()
            .ok()
            .and_then(|registry| registry.get(&id).map(|account| account.trust_all_certificates))
            .unwrap_or(false)
    }

    /// The client a task runs on.
    fn client_for(&self, kind: TransportKind, id: TaskId) -> reqwest::Client {
        let transport = self.transport(kind);
        if self.trusts_all_certificates(id) {
            transport.insecure.clone()
        } else {
            transport.standard.clone()
        }
    }

    fn register(&self, id: TaskId, account: Account) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.insert(id, account);
        }
    }

    fn deregister(&self, id: TaskId) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.remove(&id);
        }
    }

    fn task_started(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active += 1;
            if *active == 1 {
                let _ = self.activity_tx.send(true);
            }
        }
    }

    fn task_finished(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = active.saturating_sub(1);
            if *active == 0 {
                let _ = self.activity_tx.send(false);
            }
        }
    }
}

/// A raw classified response: success status, headers and body
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

/// Issues network tasks against a Jenkins server
///
/// Cheap to clone; clones share transports, registry and activity signal.
/// Construct one at startup and pass it where needed.
#[derive(Clone)]
pub struct JenkinsClient {
    inner: Arc<ClientInner>,
}

impl JenkinsClient {
    /// A client with freshly built transports.
    pub fn new() -> Result<Self> {
        let (activity_tx, _) = watch::channel(false);
        Ok(JenkinsClient {
            inner: Arc::new(ClientInner {
                default_transport: Transport::new(None)?,
                verification_transport: Transport::new(Some(VERIFICATION_TIMEOUT))?,
                action_transport: Transport::new(None)?,
                registry: Mutex::new(HashMap::new()),
                active: Mutex::new(0),
                activity_tx,
                next_task_id: AtomicU64::new(1),
            }),
        })
    }

    /// Busy signal: `true` while at least one task across any transport is
    /// in flight.
    pub fn activity(&self) -> watch::Receiver<bool> {
        self.inner.activity_tx.subscribe()
    }

    /// Number of tasks currently registered as in flight.
    pub fn in_flight(&self) -> usize {
        self.inner
            .registry
            .lock()
            .map(|registry| registry.len())
            .unwrap_or(0)
    }

    // MARK: networking abstractions

    /// Fetch the job list described by the request.
    pub fn get_jobs(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<JobList>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| JobList::parse(&json)))
        })
    }

    /// Verify an account by issuing a HEAD against its API URL on the
    /// short-timeout verification transport.
    pub fn verify_account(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<()>) + Send + 'static,
    ) -> TaskController {
        self.perform_raw(
            user_request,
            Method::HEAD,
            true,
            TransportKind::Verification,
            None,
            HashMap::new(),
            move |result| completion(result.map(|_| ())),
        )
    }

    /// Fetch a single job in its full shape.
    pub fn get_job(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<Job>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| Job::parse(&json)))
        })
    }

    /// Fetch a job's build-id list (strict decode).
    pub fn get_job_build_ids(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<JobBuildIds>) + Send + 'static,
    ) -> TaskController {
        self.perform_raw(
            user_request,
            Method::GET,
            true,
            TransportKind::Default,
            None,
            HashMap::new(),
            move |result| {
                completion(result.and_then(|response| {
                    serde_json::from_slice(&response.body)
                        .map_err(|_| ParsingError::DataNotCorrectFormat.into())
                }))
            },
        )
    }

    /// Fetch a single build in its full shape.
    pub fn get_build(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<Build>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| Build::parse(&json)))
        })
    }

    /// Fill in a build's remaining fields from the full payload.
    pub fn complete_build_information(
        &self,
        user_request: UserRequest,
        mut build: Build,
        completion: impl FnOnce(Build, Option<Error>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| match result {
            Ok(json) => {
                let error = build.add_additional_fields(&json).err();
                completion(build, error);
            }
            Err(e) => completion(build, Some(e)),
        })
    }

    /// Fetch the build queue.
    pub fn get_build_queue(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<BuildQueue>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| BuildQueue::parse(&json)))
        })
    }

    /// Fetch the computer list.
    pub fn get_computer_list(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<ComputerList>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| ComputerList::parse(&json)))
        })
    }

    /// Fetch the plugin list.
    pub fn get_plugins(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<PluginList>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| PluginList::parse(&json)))
        })
    }

    /// Fetch the user list.
    pub fn get_users(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<UserList>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| UserList::parse(&json)))
        })
    }

    /// Fetch a build's test report.
    pub fn get_test_result(
        &self,
        user_request: UserRequest,
        completion: impl FnOnce(Result<TestResult>) + Send + 'static,
    ) -> TaskController {
        self.perform_json(user_request, Method::GET, move |result| {
            completion(result.and_then(|json| TestResult::parse(&json)))
        })
    }

    /// Download an artifact's bytes.
    pub fn download_artifact(
        &self,
        artifact: &Artifact,
        account: Account,
        completion: impl FnOnce(Result<Bytes>) + Send + 'static,
    ) -> TaskController {
        let user_request = UserRequest::new(artifact.url.clone(), account);
        self.perform_raw(
            user_request,
            Method::GET,
            false,
            TransportKind::Default,
            None,
            HashMap::new(),
            move |result| completion(result.map(|response| response.body)),
        )
    }

    /// Discover an artifact's size through a metadata-only HEAD probe.
    pub fn set_size_for_artifact(
        &self,
        mut artifact: Artifact,
        account: Account,
        completion: impl FnOnce(Artifact, Option<Error>) + Send + 'static,
    ) -> TaskController {
        let user_request = UserRequest::new(artifact.url.clone(), account);
        self.perform_raw(
            user_request,
            Method::HEAD,
            false,
            TransportKind::Default,
            None,
            HashMap::new(),
            move |result| match result {
                Ok(response) => {
                    artifact.size = response
                        .headers
                        .get(CONTENT_LENGTH)
                        .and_then(|value| value.to_str().ok())
                        .and_then(|value| value.parse().ok());
                    completion(artifact, None);
                }
                Err(e) => completion(artifact, Some(e)),
            },
        )
    }

    /// The wire request fetching a build's console output, for callers that
    /// hand it to an embedded web view or log streamer.
    pub fn console_output_request(
        &self,
        build: &Build,
        account: &Account,
    ) -> Result<reqwest::Request> {
        let user_request = UserRequest::new(build.console_output_url(), account.clone());
        request::wire_request(&user_request, false, Method::GET, None, &HashMap::new())
    }

    // MARK: direct networking

    /// Perform a request and hand the body to the completion as parsed JSON.
    pub(crate) fn perform_json(
        &self,
        user_request: UserRequest,
        method: Method,
        completion: impl FnOnce(Result<serde_json::Value>) + Send + 'static,
    ) -> TaskController {
        self.perform_raw(
            user_request,
            method,
            true,
            TransportKind::Default,
            None,
            HashMap::new(),
            move |result| {
                completion(result.and_then(|response| {
                    if response.body.is_empty() {
                        return Err(Error::NoData);
                    }
                    serde_json::from_slice(&response.body).map_err(|_| Error::JsonParsing)
                }))
            },
        )
    }

    /// Submit a task: register it, run it on the chosen transport, classify
    /// the outcome.
    ///
    /// The completion is invoked exactly once for every outcome except
    /// cancellation, for which it is not invoked at all.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn perform_raw(
        &self,
        user_request: UserRequest,
        method: Method,
        use_api_url: bool,
        transport: TransportKind,
        body: Option<Vec<u8>>,
        custom_headers: HashMap<String, String>,
        completion: impl FnOnce(Result<RawResponse>) + Send + 'static,
    ) -> TaskController {
        let id = TaskId(self.inner.next_task_id.fetch_add(1, Ordering::Relaxed));
        let cancel_token = CancellationToken::new();
        let resume_signal = Arc::new(Notify::new());
        let controller = TaskController::new(id, cancel_token.clone(), resume_signal.clone());

        let request =
            match request::wire_request(&user_request, use_api_url, method, body, &custom_headers)
            {
                Ok(request) => request,
                Err(e) => {
                    warn!(task = %id, error = %e, "could not build wire request");
                    completion(Err(e));
                    return controller;
                }
            };

        // Register before submission so the trust decision can see the account.
        self.inner.register(id, user_request.account.clone());
        let client = self.inner.client_for(transport, id);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    inner.deregister(id);
                    debug!(task = %id, "task cancelled before start");
                    return;
                }
                _ = resume_signal.notified() => {}
            }

            inner.task_started();
            debug!(task = %id, url = %request.url(), "task started");

            let work = async {
                let response = client.execute(request).await?;
                let status = response.status();
                let headers = response.headers().clone();
                let body = response.bytes().await?;
                Ok::<_, reqwest::Error>(RawResponse {
                    status,
                    headers,
                    body,
                })
            };

            let outcome = tokio::select! {
                _ = cancel_token.cancelled() => None,
                result = work => Some(result),
            };

            inner.deregister(id);
            inner.task_finished();

            match outcome {
                // Cancellation suppresses the completion callback entirely.
                None => debug!(task = %id, "task cancelled"),
                Some(result) => completion(classify(result)),
            }
        });

        controller.resume();
        controller
    }
}

/// Map a transport outcome to a domain result.
fn classify(result: std::result::Result<RawResponse, reqwest::Error>) -> Result<RawResponse> {
    let response = result?;
    let code = response.status.as_u16();
    if !SUCCESS_CODES.contains(&code) {
        return Err(Error::HttpNoSuccess {
            code,
            message: response
                .status
                .canonical_reason()
                .unwrap_or("unrecognized status")
                .to_string(),
        });
    }
    Ok(response)
}

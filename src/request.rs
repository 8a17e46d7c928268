//! Logical requests and their translation into wire requests.
//!
//! A [`UserRequest`] pairs a target URL with the [`Account`] it is issued
//! under, plus any endpoint-specific query parameters. The wire translation
//! ([`wire_request`]) selects the API URL or the raw URL, attaches HTTP Basic
//! authentication when the account carries credentials, and merges
//! caller-supplied headers on top.

use crate::account::Account;
use crate::endpoints;
use crate::error::{Error, Result};
use crate::model::Parameter;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use std::collections::HashMap;
use url::Url;

/// A logical request against one account
#[derive(Clone, Debug)]
pub struct UserRequest {
    /// The request's target URL, normalized to the account's scheme and port
    pub request_url: Url,
    /// The account the request is issued under
    pub account: Account,
    /// Endpoint-specific query parameters, applied to the API URL
    additional_query_items: Vec<(String, String)>,
}

impl UserRequest {
    /// A request for the given URL under the given account.
    ///
    /// The URL's scheme and port are normalized to match the account's base
    /// URL before use.
    pub fn new(request_url: Url, account: Account) -> Self {
        UserRequest::with_query(request_url, account, Vec::new())
    }

    /// Like [`UserRequest::new`], with endpoint-specific query parameters.
    pub fn with_query(
        mut request_url: Url,
        account: Account,
        additional_query_items: Vec<(String, String)>,
    ) -> Self {
        let _ = request_url.set_scheme(account.base_url.scheme());
        if account.port.is_some() {
            let _ = request_url.set_port(account.port);
        }
        UserRequest {
            request_url,
            account,
            additional_query_items,
        }
    }

    /// The URL used for API interaction: the target URL with the fixed API
    /// suffix appended, `pretty=false` forced, and the endpoint's query
    /// parameters attached.
    pub fn api_url(&self) -> Result<Url> {
        let mut url = self.request_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::UrlBuilding)?
            .pop_if_empty()
            .extend(endpoints::API_SUFFIX);

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("pretty", "false");
            for (name, value) in &self.additional_query_items {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// The request for an account's job list, or for the job list of a
    /// specific folder URL.
    pub fn job_list(account: Account, request_url: Option<Url>) -> Self {
        let url = request_url.unwrap_or_else(|| account.base_url.clone());
        UserRequest::with_query(
            url,
            account,
            vec![("tree".to_string(), endpoints::JOB_LIST_TREE.to_string())],
        )
    }

    /// The request probing whether the server is quieting down.
    pub fn quieting_down(account: Account) -> Self {
        let url = account.base_url.clone();
        UserRequest::with_query(
            url,
            account,
            vec![("tree".to_string(), endpoints::QUIETING_DOWN_TREE.to_string())],
        )
    }

    /// The request for a single job with builds, changesets and parameters.
    pub fn job(account: Account, request_url: Url) -> Self {
        UserRequest::with_query(
            request_url,
            account,
            vec![("tree".to_string(), endpoints::job_tree())],
        )
    }

    /// The request for a job's build-id list.
    pub fn job_build_ids(account: Account, request_url: Url) -> Self {
        UserRequest::with_query(
            request_url,
            account,
            vec![("tree".to_string(), endpoints::JOB_BUILD_IDS_TREE.to_string())],
        )
    }

    /// The request for the build queue.
    pub fn build_queue(account: Account) -> Self {
        let url = joined(&account.base_url, endpoints::BUILD_QUEUE);
        UserRequest::with_query(
            url,
            account,
            vec![("tree".to_string(), endpoints::BUILD_QUEUE_TREE.to_string())],
        )
    }

    /// The request for the computer list.
    pub fn computers(account: Account) -> Self {
        let url = joined(&account.base_url, endpoints::COMPUTER);
        UserRequest::new(url, account)
    }

    /// The request for the plugin list.
    pub fn plugins(account: Account) -> Self {
        let url = joined(&account.base_url, endpoints::PLUGINS);
        UserRequest::with_query(
            url,
            account,
            vec![("depth".to_string(), endpoints::PLUGINS_DEPTH.to_string())],
        )
    }

    /// The request for the user list.
    pub fn users(account: Account) -> Self {
        let url = joined(&account.base_url, endpoints::USERS);
        UserRequest::with_query(
            url,
            account,
            vec![("tree".to_string(), endpoints::USERS_TREE.to_string())],
        )
    }

    /// The request for a build's test report.
    pub fn test_report(account: Account, build_url: &Url) -> Self {
        let url = joined(build_url, endpoints::TEST_REPORT);
        UserRequest::with_query(
            url,
            account,
            vec![("tree".to_string(), endpoints::TEST_REPORT_TREE.to_string())],
        )
    }

    /// The request for a git-backed parameter's candidate values.
    pub fn git_parameter(account: Account, job_url: &Url, parameter: &Parameter) -> Self {
        let url = joined(job_url, endpoints::GIT_PARAMETER_FILL_VALUES);
        UserRequest::with_query(
            url,
            account,
            vec![("param".to_string(), parameter.name.clone())],
        )
    }
}

/// Append a slash-separated path below a base URL.
pub(crate) fn joined(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(path.split('/'));
    }
    url
}

/// Turn a logical request into a wire request.
///
/// Caller-supplied headers are merged on top of the authentication header;
/// they can suppress authentication only by literally reusing the
/// `Authorization` key.
pub fn wire_request(
    user_request: &UserRequest,
    use_api_url: bool,
    method: Method,
    body: Option<Vec<u8>>,
    custom_headers: &HashMap<String, String>,
) -> Result<reqwest::Request> {
    let url = if use_api_url {
        user_request.api_url()?
    } else {
        user_request.request_url.clone()
    };

    let mut request = reqwest::Request::new(method, url);

    let mut headers = HeaderMap::new();
    if let Some((name, value)) = basic_authentication_header(&user_request.account)? {
        headers.insert(name, value);
    }
    for (name, value) in custom_headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::UrlBuilding)?;
        let value = HeaderValue::from_str(value).map_err(|_| Error::UrlBuilding)?;
        headers.insert(name, value);
    }
    *request.headers_mut() = headers;

    if let Some(body) = body {
        *request.body_mut() = Some(body.into());
    }

    Ok(request)
}

/// The HTTP Basic authentication header for an account, when both username
/// and secret are present: `Authorization: Basic base64(username:secret)`.
pub fn basic_authentication_header(
    account: &Account,
) -> Result<Option<(HeaderName, HeaderValue)>> {
    let (Some(username), Some(password)) = (&account.username, &account.password) else {
        return Ok(None);
    };
    let credentials = BASE64_STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {credentials}"))
        .map_err(|_| Error::UrlBuilding)?;
    value.set_sensitive(true);
    Ok(Some((AUTHORIZATION, value)))
}

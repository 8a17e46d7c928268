//! CSRF crumb acquisition.

use super::JenkinsClient;
use crate::account::Account;
use crate::endpoints;
use crate::model::Crumb;
use crate::request::{joined, UserRequest};
use reqwest::Method;
use tracing::debug;

impl JenkinsClient {
    /// Fetch a fresh crumb for an account.
    ///
    /// Any failure — transport, non-2xx, malformed JSON, missing keys —
    /// yields `None` rather than an error: callers proceed without CSRF
    /// protection and let the server reject if it requires one. Crumbs are
    /// never cached; every state-changing call fetches its own.
    pub fn fetch_crumb(
        &self,
        account: Account,
        completion: impl FnOnce(Option<Crumb>) + Send + 'static,
    ) {
        let url = joined(&account.base_url, endpoints::CRUMB_ISSUER);
        let user_request = UserRequest::new(url, account);
        self.perform_json(user_request, Method::GET, move |result| {
            let crumb = result
                .ok()
                .and_then(|json| serde_json::from_value::<Crumb>(json).ok());
            if crumb.is_none() {
                debug!("no crumb available; proceeding without CSRF token");
            }
            completion(crumb);
        });
    }
}

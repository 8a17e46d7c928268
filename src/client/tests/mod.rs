use super::*;
use crate::account::Account;
use crate::endpoints::JenkinsAction;
use crate::model::{Job, Parameter, ParameterType, ParameterValue};
use crate::request::UserRequest;
use serde_json::json;
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account_for(server: &MockServer) -> Account {
    Account::new(Url::parse(&server.uri()).unwrap())
}

fn job_at(server: &MockServer, name: &str) -> Job {
    Job::parse_minimal(&json!({
        "name": name,
        "url": format!("{}/job/{name}/", server.uri()),
        "color": "blue"
    }))
    .unwrap()
}

async fn recv<T>(rx: oneshot::Receiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("completion did not fire")
        .expect("completion sender dropped")
}

#[tokio::test]
async fn status_226_is_success_and_227_is_not() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(226).set_body_json(json!({"views": []})))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.get_jobs(
        UserRequest::job_list(account_for(&server), None),
        move |result| {
            let _ = tx.send(result);
        },
    );
    assert!(recv(rx).await.is_ok());

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(227))
        .mount(&server)
        .await;

    let (tx, rx) = oneshot::channel();
    client.get_jobs(
        UserRequest::job_list(account_for(&server), None),
        move |result| {
            let _ = tx.send(result);
        },
    );
    match recv(rx).await {
        Err(Error::HttpNoSuccess { code, .. }) => assert_eq!(code, 227),
        other => panic!("expected HttpNoSuccess, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_success_body_yields_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.get_jobs(
        UserRequest::job_list(account_for(&server), None),
        move |result| {
            let _ = tx.send(result);
        },
    );
    assert!(matches!(recv(rx).await, Err(Error::NoData)));
}

#[tokio::test]
async fn basic_auth_reaches_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"views": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut account = account_for(&server);
    account.username = Some("user".to_string());
    account.password = Some("pass".to_string());

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.get_jobs(UserRequest::job_list(account, None), move |result| {
        let _ = tx.send(result);
    });
    assert!(recv(rx).await.is_ok());
}

#[tokio::test]
async fn crumb_is_injected_as_a_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"crumb": "abc123", "crumbRequestField": "Jenkins-Crumb"}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/api/build"))
        .and(query_param("Jenkins-Crumb", "abc123"))
        .and(query_param("cause", crate::endpoints::BUILD_CAUSE))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(query_param("tree", "quietingDown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quietingDown": false})))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_build(
        account_for(&server),
        &job_at(&server, "api"),
        None,
        None,
        move |result| {
            let _ = tx.send(result);
        },
    );

    let status = recv(rx).await.unwrap();
    assert_eq!(status.map(|s| s.quieting_down), Some(false));
}

#[tokio::test]
async fn missing_crumb_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/api/build"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(query_param("tree", "quietingDown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quietingDown": true})))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_build(
        account_for(&server),
        &job_at(&server, "api"),
        None,
        None,
        move |result| {
            let _ = tx.send(result);
        },
    );
    let status = recv(rx).await.unwrap();
    assert_eq!(status.map(|s| s.quieting_down), Some(true));
}

#[tokio::test]
async fn one_text_parameter_selects_build_with_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/api/buildWithParameters"))
        .and(query_param("BRANCH", "main"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(query_param("tree", "quietingDown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quietingDown": false})))
        .mount(&server)
        .await;

    let parameter = ParameterValue::new(
        Parameter {
            name: "BRANCH".to_string(),
            kind: ParameterType::String,
            description: None,
            default_value: None,
            choices: Vec::new(),
        },
        Some("main".to_string()),
    );

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_build(
        account_for(&server),
        &job_at(&server, "api"),
        None,
        Some(vec![parameter]),
        move |result| {
            let _ = tx.send(result);
        },
    );
    assert!(recv(rx).await.is_ok());
}

#[tokio::test]
async fn file_parameter_selects_plain_build_with_multipart_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/api/build"))
        .and(body_string_contains("name=\"ARCHIVE\""))
        .and(body_string_contains("name=\"BRANCH\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(query_param("tree", "quietingDown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quietingDown": false})))
        .mount(&server)
        .await;

    let file = ParameterValue::new(
        Parameter {
            name: "ARCHIVE".to_string(),
            kind: ParameterType::File,
            description: None,
            default_value: None,
            choices: Vec::new(),
        },
        Some("payload".to_string()),
    );
    let text = ParameterValue::new(
        Parameter {
            name: "BRANCH".to_string(),
            kind: ParameterType::String,
            description: None,
            default_value: None,
            choices: Vec::new(),
        },
        Some("main".to_string()),
    );

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_build(
        account_for(&server),
        &job_at(&server, "api"),
        None,
        Some(vec![file, text]),
        move |result| {
            let _ = tx.send(result);
        },
    );
    assert!(recv(rx).await.is_ok());
}

#[tokio::test]
async fn quieting_down_probe_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/api/build"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_build(
        account_for(&server),
        &job_at(&server, "api"),
        None,
        None,
        move |result| {
            let _ = tx.send(result);
        },
    );

    // Success with no status payload, not an error.
    let status = recv(rx).await.unwrap();
    assert!(status.is_none());
}

#[tokio::test]
async fn failed_build_post_surfaces_the_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/api/build"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_build(
        account_for(&server),
        &job_at(&server, "api"),
        None,
        None,
        move |result| {
            let _ = tx.send(result);
        },
    );
    match recv(rx).await {
        Err(Error::HttpNoSuccess { code, .. }) => assert_eq!(code, 403),
        other => panic!("expected HttpNoSuccess, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_suppresses_the_completion_and_clears_the_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"views": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    let controller = client.get_jobs(
        UserRequest::job_list(account_for(&server), None),
        move |result| {
            let _ = tx.send(result);
        },
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.in_flight(), 1);
    controller.cancel();

    // The sender is dropped without ever being used.
    assert!(tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("cancelled task never released its completion")
        .is_err());
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn activity_signal_tracks_in_flight_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"views": []}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let mut activity = client.activity();
    assert!(!*activity.borrow());

    let (tx, rx) = oneshot::channel();
    client.get_jobs(
        UserRequest::job_list(account_for(&server), None),
        move |result| {
            let _ = tx.send(result);
        },
    );

    tokio::time::timeout(Duration::from_secs(2), activity.wait_for(|busy| *busy))
        .await
        .expect("activity never became busy")
        .unwrap();

    assert!(recv(rx).await.is_ok());

    tokio::time::timeout(Duration::from_secs(2), activity.wait_for(|busy| !*busy))
        .await
        .expect("activity never became idle")
        .unwrap();
}

#[tokio::test]
async fn git_parameter_fan_out_joins_before_completion() {
    let server = MockServer::start().await;

    let job_payload = json!({
        "name": "api",
        "url": format!("{}/job/api/", server.uri()),
        "color": "blue",
        "property": [{"parameterDefinitions": [
            {"name": "BRANCH", "type": "GitParameterDefinition"},
            {"name": "TAG", "type": "GitParameterDefinition"},
            {"name": "REF", "type": "GitParameterDefinition"}
        ]}]
    });
    Mock::given(method("GET"))
        .and(path("/job/api/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_payload))
        .mount(&server)
        .await;

    let fill_path = "/job/api/descriptorByName/net.uaznia.lukanus.hudson.plugins.gitparameter.GitParameterDefinition/fillValueItems/api/json";
    for (name, delay_ms) in [("BRANCH", 30u64), ("TAG", 120), ("REF", 250)] {
        Mock::given(method("GET"))
            .and(path(fill_path))
            .and(query_param("param", name))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"values": [{"value": format!("{name}-1")}]}))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let account = account_for(&server);
    let job = job_at(&server, "api");
    let user_request = UserRequest::job(account, job.url.clone());

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.complete_job_information(user_request, job, move |job, error| {
        let _ = tx.send((job, error));
    });

    let (job, error) = recv(rx).await;
    assert!(error.is_none());
    // Completion fires only once every parameter has resolved, regardless
    // of per-request timing.
    for parameter in &job.parameters {
        assert_eq!(parameter.choices.len(), 1, "unresolved {}", parameter.name);
    }
}

#[tokio::test]
async fn failed_fan_out_legs_leave_candidates_empty() {
    let server = MockServer::start().await;

    let job_payload = json!({
        "name": "api",
        "url": format!("{}/job/api/", server.uri()),
        "color": "blue",
        "property": [{"parameterDefinitions": [
            {"name": "BRANCH", "type": "GitParameterDefinition"},
            {"name": "TAG", "type": "GitParameterDefinition"}
        ]}]
    });
    Mock::given(method("GET"))
        .and(path("/job/api/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_payload))
        .mount(&server)
        .await;

    let fill_path = "/job/api/descriptorByName/net.uaznia.lukanus.hudson.plugins.gitparameter.GitParameterDefinition/fillValueItems/api/json";
    Mock::given(method("GET"))
        .and(path(fill_path))
        .and(query_param("param", "BRANCH"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"values": [{"value": "main"}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(fill_path))
        .and(query_param("param", "TAG"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let account = account_for(&server);
    let job = job_at(&server, "api");
    let user_request = UserRequest::job(account, job.url.clone());

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.complete_job_information(user_request, job, move |job, error| {
        let _ = tx.send((job, error));
    });

    let (job, error) = recv(rx).await;
    assert!(error.is_none());
    assert_eq!(job.parameters[0].choices, vec!["main".to_string()]);
    assert!(job.parameters[1].choices.is_empty());
}

#[tokio::test]
async fn administrative_action_posts_to_its_fixed_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"crumb": "c0ffee", "crumbRequestField": "Jenkins-Crumb"}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/quietDown"))
        .and(query_param("Jenkins-Crumb", "c0ffee"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.perform_action(JenkinsAction::QuietDown, account_for(&server), move |result| {
        let _ = tx.send(result);
    });
    assert!(recv(rx).await.is_ok());
}

#[tokio::test]
async fn verify_account_reports_http_failures() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.verify_account(
        UserRequest::new(
            Url::parse(&server.uri()).unwrap(),
            account_for(&server),
        ),
        move |result| {
            let _ = tx.send(result);
        },
    );
    match recv(rx).await {
        Err(Error::HttpNoSuccess { code, .. }) => assert_eq!(code, 401),
        other => panic!("expected HttpNoSuccess, got {other:?}"),
    }
}

#[tokio::test]
async fn artifact_size_comes_from_the_content_length_header() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/job/api/3/artifact/target/api.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let artifact = crate::model::Artifact {
        url: Url::parse(&format!("{}/job/api/3/artifact/target/api.jar", server.uri())).unwrap(),
        filename: "api.jar".to_string(),
        relative_path: "target/api.jar".to_string(),
        size: None,
    };

    let client = JenkinsClient::new().unwrap();
    let (tx, rx) = oneshot::channel();
    client.set_size_for_artifact(artifact, account_for(&server), move |artifact, error| {
        let _ = tx.send((artifact, error));
    });

    let (artifact, error) = recv(rx).await;
    assert!(error.is_none());
    assert_eq!(artifact.size, Some(4096));
}

#[tokio::test]
async fn trust_override_selects_the_insecure_transport_only_for_flagged_accounts() {
    let client = JenkinsClient::new().unwrap();

    let mut trusted = Account::new(Url::parse("https://jenkins.example.com/").unwrap());
    trusted.trust_all_certificates = true;
    let untrusted = Account::new(Url::parse("https://jenkins.example.com/").unwrap());

    let trusted_id = TaskId(9001);
    let untrusted_id = TaskId(9002);
    client.inner.register(trusted_id, trusted);
    client.inner.register(untrusted_id, untrusted);

    // The registry entry decides; a lookup miss falls back to standard
    // validation.
    assert!(client.inner.trusts_all_certificates(trusted_id));
    assert!(!client.inner.trusts_all_certificates(untrusted_id));
    assert!(!client.inner.trusts_all_certificates(TaskId(9003)));

    client.inner.deregister(trusted_id);
    client.inner.deregister(untrusted_id);
}

//! Jenkins endpoint paths, `tree` projections and related protocol constants.
//!
//! Every read endpoint carries a fixed `tree` query parameter selecting the
//! subset of server-side fields to return, keeping payloads small on mobile
//! connections. The values mirror what the server-side remote access API
//! understands; they are opaque to the rest of the crate.

/// Suffix appended to any request URL to reach the JSON remote access API
pub const API_SUFFIX: [&str; 2] = ["api", "json"];

/// Path of the console text output below a build URL
pub const CONSOLE_OUTPUT: &str = "consoleText";

/// Path of the build queue
pub const BUILD_QUEUE: &str = "queue";

/// Path of the computer (node) list
pub const COMPUTER: &str = "computer";

/// Path of the plugin manager
pub const PLUGINS: &str = "pluginManager";

/// Path of the user list
pub const USERS: &str = "asynchPeople";

/// Path of the test report below a build URL
pub const TEST_REPORT: &str = "testReport";

/// Path of the CSRF crumb issuer
pub const CRUMB_ISSUER: &str = "crumbIssuer";

/// Path of the git-parameter value-choice endpoint below a job URL
pub const GIT_PARAMETER_FILL_VALUES: &str =
    "descriptorByName/net.uaznia.lukanus.hudson.plugins.gitparameter.GitParameterDefinition/fillValueItems";

/// The `cause` string identifying this client on triggered builds
pub const BUILD_CAUSE: &str = "Caused by Butler client";

/// Status codes that count as protocol-level success
pub const SUCCESS_CODES: [u16; 10] = [200, 201, 202, 203, 204, 205, 206, 207, 208, 226];

/// `tree` projection for the job list
pub const JOB_LIST_TREE: &str = "views[name,url,jobs[name,url,color,healthReport[description,score,iconClassName],lastBuild[timestamp,number,url]]],nodeDescription,nodeName,mode,description";

/// `tree` projection for the quieting-down probe
pub const QUIETING_DOWN_TREE: &str = "quietingDown";

/// `tree` projection for a single job, including builds, changesets and parameters
pub fn job_tree() -> String {
    let changeset_fields =
        "kind,items[commitId,timestamp,comment,date,msg,affectedPaths,author[absoluteUrl,fullName]]";
    let build_fields = format!(
        "duration,timestamp,fullDisplayName,result,id,url,artifacts,actions,number,artifacts[fileName,relativePath],changeSet[{changeset_fields}],changeSets[{changeset_fields}]"
    );
    format!(
        "color,url,name,description,healthReport[description,score,iconClassName],lastBuild[{build_fields}],builds[{build_fields}],property[parameterDefinitions[*]],actions[*[*]]"
    )
}

/// `tree` projection for a job's build-id list
pub const JOB_BUILD_IDS_TREE: &str = "builds[id]";

/// `tree` projection for the build queue
pub const BUILD_QUEUE_TREE: &str = "items[url,why,blocked,buildable,id,inQueueSince,params,stuck,task[name,url,color,healthReport[description,score,iconClassName]],actions[causes[shortDescription,userId,username],failCount,skipCount,totalCount,urlName],buildableStartMilliseconds]";

/// `tree` projection for the user list
pub const USERS_TREE: &str = "users[*,user[id,fullName,description,absoluteUrl]]";

/// `tree` projection for the test report
pub const TEST_REPORT_TREE: &str = "suites[name,cases[className,name,status]],childReports[child[url],result[suites[name,cases[className,name,status]],failCount,passCount,skipCount]],failCount,skipCount,passCount,totalCount";

/// `depth` value for the plugin list
pub const PLUGINS_DEPTH: &str = "2";

/// Administrative actions the server accepts, each mapping to a fixed path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JenkinsAction {
    /// Stop accepting new builds while existing ones drain
    QuietDown,
    /// Leave the quieting-down state
    CancelQuietDown,
    /// Restart immediately
    Restart,
    /// Restart once all builds have finished
    SafeRestart,
    /// Shut down immediately
    Exit,
    /// Shut down once all builds have finished
    SafeExit,
}

impl JenkinsAction {
    /// The server-side path the action is posted to
    pub fn path(self) -> &'static str {
        match self {
            JenkinsAction::QuietDown => "quietDown",
            JenkinsAction::CancelQuietDown => "cancelQuietDown",
            JenkinsAction::Restart => "restart",
            JenkinsAction::SafeRestart => "safeRestart",
            JenkinsAction::Exit => "exit",
            JenkinsAction::SafeExit => "safeExit",
        }
    }
}

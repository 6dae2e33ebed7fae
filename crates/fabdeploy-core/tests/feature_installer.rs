//! Tests for the repository-then-feature installation sequence.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use fabdeploy_core::DeployError;
use fabdeploy_core::DeployResult;
use fabdeploy_core::install::{FeatureInstaller, InstallPlan, RetryPolicy};
use fabdeploy_core::remote::{ManagementClient, ManagementRequest, ManagementResponse};
use serde_json::json;

/// Records every request and replays scripted outcomes; succeeds once the
/// script runs out.
#[derive(Default)]
struct RecordingClient {
    calls: RefCell<Vec<ManagementRequest>>,
    script: RefCell<VecDeque<DeployResult<ManagementResponse>>>,
}

impl RecordingClient {
    fn scripted(outcomes: Vec<DeployResult<ManagementResponse>>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            script: RefCell::new(outcomes.into()),
        }
    }

    fn operations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|r| r.operation_name().to_string())
            .collect()
    }
}

impl ManagementClient for RecordingClient {
    fn execute(&self, request: &ManagementRequest) -> DeployResult<ManagementResponse> {
        self.calls.borrow_mut().push(request.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ManagementResponse::Success(json!({"status": 200}))))
    }
}

fn remote_failure(message: &str) -> DeployResult<ManagementResponse> {
    Ok(ManagementResponse::Failure {
        status: 500,
        error_type: Some("java.lang.Exception".into()),
        message: message.into(),
    })
}

/// Shared sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber installed and return what it logged.
fn captured_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn features_only_issues_single_install_call() {
    let client = RecordingClient::default();
    let installer = FeatureInstaller::new(InstallPlan::new(Some(""), Some("myFeature")));

    let report = installer.install(&client, &RetryPolicy::default()).unwrap();

    assert_eq!(client.operations(), vec!["installFeature"]);
    assert_eq!(report.calls.len(), 1);
    assert_eq!(report.calls[0].argument, "myFeature");
    assert_eq!(report.attempts, 1);
}

#[test]
fn repository_is_registered_before_feature_install() {
    let client = RecordingClient::default();
    let installer = FeatureInstaller::new(InstallPlan::new(Some("repoA"), Some("featB")));

    installer.install(&client, &RetryPolicy::default()).unwrap();

    assert_eq!(client.operations(), vec!["addRepository", "installFeature"]);
    let calls = client.calls.borrow();
    assert_eq!(calls[0].arguments, vec!["repoA".to_string()]);
    assert_eq!(calls[1].arguments, vec!["featB".to_string()]);
    assert!(calls.iter().all(|c| c.resource.name() == "features"));
}

#[test]
fn repositories_only_issues_single_add_call() {
    let client = RecordingClient::default();
    let installer = FeatureInstaller::new(InstallPlan::new(Some("repoA"), None));

    installer.install(&client, &RetryPolicy::default()).unwrap();

    assert_eq!(client.operations(), vec!["addRepository"]);
}

#[test]
fn nothing_configured_makes_no_calls() {
    let client = RecordingClient::default();
    let installer = FeatureInstaller::new(InstallPlan::new(None, Some("  ")));

    let report = installer.install(&client, &RetryPolicy::default()).unwrap();

    assert!(client.operations().is_empty());
    assert!(report.calls.is_empty());
}

#[test]
fn repository_failure_aborts_before_install() {
    let client = RecordingClient::scripted(vec![remote_failure("Invalid repository URL")]);
    let installer = FeatureInstaller::new(InstallPlan::new(Some("bad"), Some("featB")));

    let err = installer
        .install(&client, &RetryPolicy::default())
        .unwrap_err();

    assert_eq!(client.operations(), vec!["addRepository"]);
    match err {
        DeployError::RemoteOperation { operation, message } => {
            assert_eq!(operation, "addRepository");
            assert_eq!(message, "Invalid repository URL");
        }
        other => panic!("expected remote operation error, got {other:?}"),
    }
}

#[test]
fn install_failure_leaves_registered_repository_in_place() {
    let client = RecordingClient::scripted(vec![
        Ok(ManagementResponse::Success(json!({"status": 200}))),
        remote_failure("No feature named 'featB' available"),
    ]);
    let installer = FeatureInstaller::new(InstallPlan::new(Some("repoA"), Some("featB")));

    let err = installer
        .install(&client, &RetryPolicy::default())
        .unwrap_err();

    // No compensating removeRepository call
    assert_eq!(client.operations(), vec!["addRepository", "installFeature"]);
    assert!(matches!(err, DeployError::RemoteOperation { .. }));
}

#[test]
fn retry_reruns_whole_sequence_from_idle() {
    let client = RecordingClient::scripted(vec![
        Ok(ManagementResponse::Success(json!({"status": 200}))),
        Err(DeployError::transport("connection reset")),
    ]);
    let installer = FeatureInstaller::new(InstallPlan::new(Some("repoA"), Some("featB")));

    let report = installer
        .install(&client, &RetryPolicy::from_configured(3))
        .unwrap();

    assert_eq!(
        client.operations(),
        vec![
            "addRepository",
            "installFeature",
            "addRepository",
            "installFeature"
        ]
    );
    assert_eq!(report.attempts, 2);
    assert_eq!(report.calls.len(), 2);
}

#[test]
fn failure_surfaces_after_clamped_attempts() {
    let client = RecordingClient::scripted(
        (0..20)
            .map(|_| Err(DeployError::transport("connection refused")))
            .collect(),
    );
    let installer = FeatureInstaller::new(InstallPlan::new(None, Some("featB")));

    let err = installer
        .install(&client, &RetryPolicy::from_configured(15))
        .unwrap_err();

    assert_eq!(client.operations().len(), 10);
    assert!(matches!(err, DeployError::RemoteTransport { .. }));
}

#[test]
fn zero_retry_count_still_runs_once() {
    let client = RecordingClient::scripted(vec![Err(DeployError::transport("down"))]);
    let installer = FeatureInstaller::new(InstallPlan::new(None, Some("featB")));

    installer
        .install(&client, &RetryPolicy::from_configured(0))
        .unwrap_err();

    assert_eq!(client.operations().len(), 1);
}

#[test]
fn skipped_steps_are_logged_as_warnings() {
    let client = RecordingClient::default();
    let installer = FeatureInstaller::new(InstallPlan::new(None, Some("  ")));

    let logs = captured_logs(|| {
        installer.run_once(&client).unwrap();
    });

    let skipped: Vec<&str> = logs.lines().filter(|l| l.contains("skipping")).collect();
    assert_eq!(skipped.len(), 2, "logs were: {logs}");
    assert!(skipped.iter().all(|line| line.contains("WARN")));
}

#[test]
fn remote_failure_is_logged_as_error() {
    let client = RecordingClient::scripted(vec![remote_failure("no such repo")]);
    let installer = FeatureInstaller::new(InstallPlan::new(Some("repoA"), None));

    let logs = captured_logs(|| {
        installer.run_once(&client).unwrap_err();
    });

    let failure = logs
        .lines()
        .find(|l| l.contains("Remote operation failed: no such repo"))
        .unwrap_or_else(|| panic!("no failure line in: {logs}"));
    assert!(failure.contains("ERROR"));
}

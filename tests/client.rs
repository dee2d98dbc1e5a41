// ABOUTME: Integration tests for the client facade against a scripted fake CLI.
// ABOUTME: Validates argument assembly, registry prefixing, image resolution, and tagging.

mod support;

use dockwrap::client::{ClientConfig, ClientErrorKind, DockerClient};
use dockwrap::process::{DaemonLossPolicy, ProcessError};
use std::sync::Arc;
use std::time::Duration;
use support::fake_cli::FakeCli;
use support::probes::FixedProbe;
use tempfile::TempDir;

fn client_for(fake: &FakeCli) -> DockerClient {
    DockerClient::with_config(ClientConfig::new(fake.path()))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// build / run
// =============================================================================

#[tokio::test]
async fn build_runs_in_context_dir() {
    support::init_tracing();
    let fake = FakeCli::new("");
    let context = TempDir::new().unwrap();

    let result = client_for(&fake).build("app:latest", context.path(), &[]).await;

    assert!(result.success(), "unexpected error: {:?}", result.error);
    let expected = context.path().canonicalize().unwrap();
    assert_eq!(
        result.output,
        format!("{}Successfully built", expected.display())
    );
}

#[tokio::test]
async fn build_invocation_string() {
    let fake = FakeCli::new("");
    let context = TempDir::new().unwrap();
    let mut client = client_for(&fake).with_probe(Arc::new(FixedProbe(true)));
    client.config_mut().dockerfile = "Dockerfile.ci".to_string();

    let result = client
        .build("app:1.0", context.path(), &strings(&["--no-cache", "--pull"]))
        .await;

    assert_eq!(
        result.command,
        format!(
            "{} build -f Dockerfile.ci -t app:1.0 --no-cache --pull .",
            fake.path().display()
        )
    );
    assert_eq!(
        fake.calls(),
        vec!["build -f Dockerfile.ci -t app:1.0 --no-cache --pull ."]
    );
}

#[tokio::test]
async fn run_uses_current_dir_and_argument_order() {
    let fake = FakeCli::new("");

    let result = client_for(&fake)
        .run(
            "app:latest",
            &strings(&["make", "test"]),
            &strings(&["/src:/src"]),
            &strings(&["CI=1", "RUST_LOG=debug"]),
            &strings(&["--rm"]),
        )
        .await;

    assert!(result.success(), "unexpected error: {:?}", result.error);
    assert_eq!(
        result.command,
        format!(
            "{} run -v /src:/src -e CI=1 -e RUST_LOG=debug --rm app:latest make test",
            fake.path().display()
        )
    );
    let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
    assert_eq!(result.output, cwd.display().to_string());
}

#[tokio::test]
async fn show_output_does_not_change_captured_output() {
    let fake = FakeCli::new("");
    let context = TempDir::new().unwrap();
    let mut client = client_for(&fake);

    let quiet = client.build("app", context.path(), &[]).await;
    client.config_mut().show_output = true;
    let echoed = client.build("app", context.path(), &[]).await;

    assert_eq!(quiet.output, echoed.output);
}

#[tokio::test]
async fn build_reports_daemon_loss() {
    let fake = FakeCli::new("");
    let context = TempDir::new().unwrap();
    let mut config = ClientConfig::new(fake.path());
    config.on_daemon_loss = DaemonLossPolicy::Kill;
    let client = DockerClient::with_config(config).with_probe(Arc::new(FixedProbe(false)));

    let result = client.build("app", context.path(), &[]).await;

    let err = result.error.expect("daemon loss should fail the build");
    assert_eq!(err.to_string(), "Lost connection to Docker daemon");
}

#[tokio::test]
async fn build_with_unreachable_daemon_fails() {
    let fake = FakeCli::unreachable();
    let context = TempDir::new().unwrap();
    let mut config = ClientConfig::new(fake.path());
    config.probe_interval = Duration::from_millis(50);
    config.on_daemon_loss = DaemonLossPolicy::Kill;

    let result = DockerClient::with_config(config)
        .build("app", context.path(), &[])
        .await;

    // Either the probe or the failing build wins the race; both are errors.
    assert!(matches!(
        result.error,
        Some(ProcessError::DaemonLost) | Some(ProcessError::Exit(_))
    ));
}

// =============================================================================
// push / pull
// =============================================================================

#[tokio::test]
async fn push_default_registry_keeps_name() {
    let fake = FakeCli::new("");

    let result = client_for(&fake).push("app:latest").await;

    assert!(result.success());
    assert_eq!(fake.calls(), vec!["push app:latest"]);
    assert!(result.output.contains("push app:latest"));
    assert!(result.output.contains("progress on stderr"));
}

#[tokio::test]
async fn push_custom_registry_prefixes_name() {
    let fake = FakeCli::new("");
    let mut client = client_for(&fake);
    client.config_mut().registry_host = "myregistry.com".to_string();

    let result = client.push("app:latest").await;

    assert!(result.success());
    assert_eq!(fake.calls(), vec!["push myregistry.com/app:latest"]);
}

#[tokio::test]
async fn pull_custom_registry_prefixes_name() {
    let fake = FakeCli::new("");
    let mut client = client_for(&fake);
    client.config_mut().registry_host = "registry.internal:5000".to_string();

    let result = client.pull("tools/builder:v2").await;

    assert!(result.success());
    assert_eq!(fake.calls(), vec!["pull registry.internal:5000/tools/builder:v2"]);
}

#[tokio::test]
async fn push_failure_keeps_output() {
    let fake = FakeCli::unreachable();

    let result = client_for(&fake).push("app:latest").await;

    assert!(result.output.contains("Cannot connect to the Docker daemon"));
    assert_eq!(result.error.and_then(|e| e.exit_code()), Some(1));
}

// =============================================================================
// image_id / tag
// =============================================================================

#[tokio::test]
async fn image_id_none_matching() {
    let fake = FakeCli::new("");
    assert_eq!(client_for(&fake).image_id("app").await.unwrap(), "");
}

#[tokio::test]
async fn image_id_single_match_is_trimmed() {
    let fake = FakeCli::new("4f9e2d1c0a7b  \n");
    assert_eq!(
        client_for(&fake).image_id("app").await.unwrap(),
        "4f9e2d1c0a7b"
    );
    assert_eq!(fake.calls(), vec!["images -q app"]);
}

#[tokio::test]
async fn image_id_multiple_matches_is_ambiguous() {
    let fake = FakeCli::new("4f9e2d1c0a7b\n9a8b7c6d5e4f\n");

    let err = client_for(&fake).image_id("app").await.unwrap_err();
    assert_eq!(err.kind(), ClientErrorKind::AmbiguousImage);
}

#[tokio::test]
async fn image_id_command_failure() {
    let fake = FakeCli::unreachable();

    let err = client_for(&fake).image_id("app").await.unwrap_err();
    assert_eq!(err.kind(), ClientErrorKind::CommandFailed);
}

#[tokio::test]
async fn tag_resolves_id_first() {
    let fake = FakeCli::new("4f9e2d1c0a7b\n");

    client_for(&fake).tag("app:latest", "app:v2").await.unwrap();

    assert_eq!(
        fake.calls(),
        vec!["images -q app:latest", "tag -f 4f9e2d1c0a7b app:v2"]
    );
}

#[tokio::test]
async fn tag_ambiguous_never_runs_tag() {
    let fake = FakeCli::new("4f9e2d1c0a7b\n9a8b7c6d5e4f\n");

    let err = client_for(&fake).tag("app", "app:v2").await.unwrap_err();

    assert_eq!(err.kind(), ClientErrorKind::AmbiguousImage);
    assert!(!fake.was_called("tag"));
}

#[tokio::test]
async fn tag_missing_image_never_runs_tag() {
    let fake = FakeCli::new("");

    let err = client_for(&fake).tag("app", "app:v2").await.unwrap_err();

    assert_eq!(err.kind(), ClientErrorKind::ImageNotFound);
    assert!(!fake.was_called("tag"));
}

// =============================================================================
// connectivity / misc
// =============================================================================

#[tokio::test]
async fn is_connected_with_healthy_daemon() {
    let fake = FakeCli::new("");
    assert!(client_for(&fake).is_connected().await);
    assert_eq!(fake.calls(), vec!["info"]);
}

#[tokio::test]
async fn is_connected_with_unreachable_daemon() {
    let fake = FakeCli::unreachable();
    assert!(!client_for(&fake).is_connected().await);
}

#[tokio::test]
async fn is_connected_with_missing_executable() {
    let dir = TempDir::new().unwrap();
    let client = DockerClient::with_config(ClientConfig::new(dir.path().join("docker")));
    assert!(!client.is_connected().await);
}

#[tokio::test]
async fn version_is_always_none() {
    let fake = FakeCli::new("");
    assert_eq!(client_for(&fake).version(), None);
    assert!(fake.calls().is_empty());
}

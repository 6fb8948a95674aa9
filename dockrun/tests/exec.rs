//! Integration tests for exec sessions and output demultiplexing.

use std::time::Duration;

use dockrun::{ContainerHandle, DockrunError, DockrunOptions, OutputChunk, RunSpec};
use dockrun_test_utils::{Call, FakeRuntime, Failpoint, controller, controller_with};

fn stdout(text: &str) -> OutputChunk {
    OutputChunk::Stdout(text.as_bytes().to_vec())
}

fn stderr(text: &str) -> OutputChunk {
    OutputChunk::Stderr(text.as_bytes().to_vec())
}

async fn running(controller: &dockrun::Controller) -> ContainerHandle {
    controller.run_detached(RunSpec::new("alpine")).await.unwrap()
}

// ============================================================================
// DEMULTIPLEXING
// ============================================================================

#[tokio::test]
async fn exec_splits_stdout_and_stderr() {
    let (controller, _runtime) = controller(FakeRuntime::new().with_exec_output(vec![
        stdout("line 1\n"),
        stderr("warn 1\n"),
        stdout("line 2\n"),
        stderr("warn 2\n"),
    ]));
    let handle = running(&controller).await;

    let result = controller
        .exec(&handle, ["sh", "-c", "do-things"])
        .await
        .unwrap();

    assert_eq!(result.stdout, "line 1\nline 2\n");
    assert_eq!(result.stderr, "warn 1\nwarn 2\n");
    assert_eq!(result.exit_code, 0);
}

#[tokio::test]
async fn exec_reports_nonzero_exit() {
    let (controller, _runtime) = controller(
        FakeRuntime::new()
            .with_exec_output(vec![stderr("ls: /nope: No such file or directory\n")])
            .with_exec_exit_code(Some(1)),
    );
    let handle = running(&controller).await;

    let result = controller.exec(&handle, ["ls", "/nope"]).await.unwrap();
    assert_eq!(result.exit_code, 1);
    assert!(!result.success());
    assert!(result.stdout.is_empty());
    assert!(result.stderr.contains("No such file"));
}

#[tokio::test]
async fn exec_passes_command_to_runtime() {
    let (controller, runtime) = controller(FakeRuntime::new());
    let handle = running(&controller).await;

    controller.exec(&handle, ["cat", "/etc/os-release"]).await.unwrap();

    assert!(runtime.calls().contains(&Call::CreateExec {
        container_id: handle.id().to_string(),
        command: vec!["cat".into(), "/etc/os-release".into()],
    }));
}

#[tokio::test]
async fn empty_command_is_rejected() {
    let (controller, runtime) = controller(FakeRuntime::new());
    let handle = running(&controller).await;

    let err = controller
        .exec(&handle, Vec::<String>::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DockrunError::InvalidArgument(_)));
    assert_eq!(runtime.count(|c| matches!(c, Call::CreateExec { .. })), 0);
}

// ============================================================================
// EXIT CODE INSPECTION
// ============================================================================

#[tokio::test]
async fn inspection_waits_for_exec_to_finish() {
    let (controller, runtime) = controller(
        FakeRuntime::new()
            .with_exec_running_for(3)
            .with_exec_exit_code(Some(7)),
    );
    let handle = running(&controller).await;

    let result = controller.exec(&handle, ["true"]).await.unwrap();

    assert_eq!(result.exit_code, 7);
    assert_eq!(runtime.count(|c| matches!(c, Call::InspectExec(_))), 4);
}

#[tokio::test]
async fn missing_exit_code_is_an_error() {
    let (controller, _runtime) = controller(FakeRuntime::new().with_exec_exit_code(None));
    let handle = running(&controller).await;

    let err = controller.exec(&handle, ["true"]).await.unwrap_err();
    assert!(matches!(err, DockrunError::Exec { .. }));
}

#[tokio::test]
async fn stream_error_skips_inspection() {
    let (controller, runtime) = controller(
        FakeRuntime::new()
            .with_exec_output(vec![stdout("half")])
            .fail_at(Failpoint::ExecStream),
    );
    let handle = running(&controller).await;

    let err = controller.exec(&handle, ["cat", "big"]).await.unwrap_err();

    assert!(matches!(err, DockrunError::Exec { .. }));
    assert_eq!(runtime.count(|c| matches!(c, Call::InspectExec(_))), 0);
}

#[tokio::test]
async fn create_exec_failure_is_propagated() {
    let (controller, runtime) = controller(FakeRuntime::new().fail_at(Failpoint::CreateExec));
    let handle = running(&controller).await;

    let err = controller.exec(&handle, ["true"]).await.unwrap_err();

    assert!(matches!(err, DockrunError::Exec { .. }));
    assert_eq!(runtime.count(|c| matches!(c, Call::StartExec(_))), 0);
}

// ============================================================================
// DEADLINES
// ============================================================================

#[tokio::test]
async fn deadline_elapses_on_slow_output() {
    let (controller, runtime) = controller(
        FakeRuntime::new()
            .with_exec_delay(Duration::from_secs(5))
            .with_exec_output(vec![stdout("late")]),
    );
    let handle = running(&controller).await;

    let err = controller
        .exec_with_deadline(&handle, ["sleep", "5"], Some(Duration::from_millis(50)))
        .await
        .unwrap_err();

    assert!(matches!(err, DockrunError::Timeout { operation: "exec", .. }));
    assert_eq!(runtime.count(|c| matches!(c, Call::InspectExec(_))), 0);
}

#[tokio::test]
async fn deadline_not_hit_returns_output() {
    let (controller, _runtime) = controller(
        FakeRuntime::new()
            .with_exec_delay(Duration::from_millis(10))
            .with_exec_output(vec![stdout("done\n")]),
    );
    let handle = running(&controller).await;

    let result = controller
        .exec_with_deadline(&handle, ["echo", "done"], Some(Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(result.stdout, "done\n");
}

#[tokio::test]
async fn default_deadline_comes_from_options() {
    let options = DockrunOptions {
        exec_timeout_secs: Some(0),
        ..Default::default()
    };
    let (controller, _runtime) = controller_with(
        FakeRuntime::new().with_exec_delay(Duration::from_secs(5)),
        options,
    );
    let handle = running(&controller).await;

    let err = controller.exec(&handle, ["sleep", "5"]).await.unwrap_err();
    assert!(matches!(err, DockrunError::Timeout { .. }));
}

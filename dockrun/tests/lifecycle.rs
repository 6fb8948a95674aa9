//! Integration tests for the one-shot lifecycle (create, wait, log, remove).

use std::time::Duration;

use dockrun::{
    ContainerHandle, DockrunError, DockrunOptions, LogOutcome, OutputChunk, RunSpec, VolumeMount,
};
use dockrun_test_utils::{Call, FakeRuntime, Failpoint, controller, controller_with};

fn chunk(text: &str) -> OutputChunk {
    OutputChunk::Console(text.as_bytes().to_vec())
}

// ============================================================================
// RUN AND CLEAN
// ============================================================================

#[tokio::test]
async fn run_and_clean_returns_exit_code_and_log() {
    let (controller, runtime) =
        controller(FakeRuntime::new().with_log(vec![chunk("hello world\r\n")]));

    let result = controller
        .run_and_clean(RunSpec::new("alpine").args(["echo", "hello world"]))
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.combined_log(), "hello world\r\n");
    assert_eq!(result.log, LogOutcome::Complete("hello world\r\n".into()));
    assert_eq!(runtime.removals(), vec!["fake-0001"]);
    assert!(runtime.containers().is_empty());
}

#[tokio::test]
async fn run_and_clean_calls_runtime_in_order() {
    let (controller, runtime) = controller(FakeRuntime::new());

    controller
        .run_and_clean(RunSpec::new("alpine").arg("true"))
        .await
        .unwrap();

    let calls = runtime.calls();
    let kinds: Vec<&str> = calls
        .iter()
        .map(|call| match call {
            Call::CreateContainer(_) => "create",
            Call::StartContainer(_) => "start",
            Call::ListContainers => "list",
            Call::WaitContainer(_) => "wait",
            Call::ContainerLogs(_) => "logs",
            Call::RemoveContainer { .. } => "remove",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["create", "start", "list", "wait", "logs", "remove"]);
    // exited containers are removed without force
    assert_eq!(runtime.forced_removals(), [false]);
}

#[tokio::test]
async fn nonzero_exit_is_a_result() {
    let (controller, runtime) = controller(
        FakeRuntime::new()
            .with_exit_code(3)
            .with_log(vec![chunk("boom\n")]),
    );

    let result = controller
        .run_and_clean(RunSpec::new("alpine").args(["sh", "-c", "echo boom; exit 3"]))
        .await
        .unwrap();

    assert_eq!(result.exit_code, 3);
    assert!(!result.success());
    assert_eq!(result.combined_log(), "boom\n");
    assert_eq!(runtime.removals().len(), 1);
}

#[tokio::test]
async fn one_shot_runs_allocate_a_tty_with_resolved_mounts() {
    let (controller, runtime) = controller(FakeRuntime::new());

    controller
        .run_and_clean(
            RunSpec::new("python:3.10-slim-buster")
                .args(["ls", "-lah", "/test"])
                .mount(VolumeMount::new("/tmp/x", "/test"))
                .mount(VolumeMount::new("/tmp/y", "/data")),
        )
        .await
        .unwrap();

    let request = &runtime.creates()[0];
    assert!(request.tty);
    assert_eq!(request.command, vec!["ls", "-lah", "/test"]);
    let targets: Vec<&str> = request.mounts.iter().map(|m| m.target.as_str()).collect();
    assert_eq!(targets, ["/test", "/data"]);
}

#[tokio::test]
async fn create_failure_skips_removal() {
    let (controller, runtime) = controller(FakeRuntime::new().fail_at(Failpoint::Create));

    let err = controller
        .run_and_clean(RunSpec::new("does-not-exist"))
        .await
        .unwrap_err();

    assert!(matches!(err, DockrunError::Create { .. }));
    assert!(runtime.removals().is_empty());
}

#[tokio::test]
async fn empty_image_fails_as_create_without_touching_the_runtime() {
    let (controller, runtime) = controller(FakeRuntime::new());

    let err = controller.run_and_clean(RunSpec::new("")).await.unwrap_err();

    match err {
        DockrunError::Create { image, message } => {
            assert_eq!(image, "");
            assert!(message.contains("empty"));
        }
        other => panic!("expected a create error, got {other:?}"),
    }
    assert_eq!(runtime.count(|c| matches!(c, Call::CreateContainer(_))), 0);
    assert!(runtime.removals().is_empty());
}

#[tokio::test]
async fn start_failure_removes_created_container() {
    let (controller, runtime) = controller(FakeRuntime::new().fail_at(Failpoint::Start));

    let err = controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap_err();

    assert!(matches!(err, DockrunError::Start { .. }));
    assert_eq!(runtime.removals(), vec!["fake-0001"]);
    assert_eq!(runtime.count(|c| matches!(c, Call::WaitContainer(_))), 0);
}

#[tokio::test]
async fn wait_failure_still_removes() {
    let (controller, runtime) = controller(FakeRuntime::new().fail_at(Failpoint::Wait));

    let err = controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap_err();

    assert!(matches!(err, DockrunError::Wait { .. }));
    assert_eq!(runtime.removals(), vec!["fake-0001"]);
    // the container may still be running, so removal must be forced
    assert_eq!(runtime.forced_removals(), [true]);
    assert!(runtime.containers().is_empty());
    assert_eq!(runtime.count(|c| matches!(c, Call::ContainerLogs(_))), 0);
}

#[tokio::test]
async fn list_failure_is_propagated_and_removes() {
    let (controller, runtime) = controller(FakeRuntime::new().fail_at(Failpoint::List));

    let err = controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap_err();

    assert!(matches!(err, DockrunError::List(_)));
    assert_eq!(runtime.removals().len(), 1);
    assert_eq!(runtime.forced_removals(), [true]);
    assert!(runtime.containers().is_empty());
}

#[tokio::test]
async fn remove_failure_is_swallowed() {
    let (controller, runtime) = controller(
        FakeRuntime::new()
            .fail_at(Failpoint::Remove)
            .with_log(vec![chunk("ok\n")]),
    );

    let result = controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap();

    assert_eq!(result.combined_log(), "ok\n");
    assert_eq!(runtime.removals().len(), 1);
}

#[tokio::test]
async fn keep_on_failure_skips_removal() {
    let options = DockrunOptions {
        keep_on_failure: true,
        ..Default::default()
    };
    let (controller, runtime) =
        controller_with(FakeRuntime::new().fail_at(Failpoint::Wait), options);

    controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap_err();

    assert!(runtime.removals().is_empty());
    assert_eq!(runtime.containers(), vec!["fake-0001"]);
}

#[tokio::test]
async fn keep_on_failure_still_removes_after_success() {
    let options = DockrunOptions {
        keep_on_failure: true,
        ..Default::default()
    };
    let (controller, runtime) = controller_with(FakeRuntime::new(), options);

    controller.run_and_clean(RunSpec::new("alpine")).await.unwrap();
    assert_eq!(runtime.removals().len(), 1);
}

#[tokio::test]
async fn abandoned_run_removes_in_background() {
    let (controller, runtime) =
        controller(FakeRuntime::new().with_wait_delay(Duration::from_secs(30)));

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        controller.run_and_clean(RunSpec::new("alpine").args(["sleep", "30"])),
    )
    .await;
    assert!(outcome.is_err());

    for _ in 0..50 {
        if !runtime.removals().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(runtime.removals(), vec!["fake-0001"]);
    assert_eq!(runtime.forced_removals(), [true]);
    assert!(runtime.containers().is_empty());
}

// ============================================================================
// LOG FETCH
// ============================================================================

#[tokio::test]
async fn log_stream_error_degrades_the_result() {
    let (controller, runtime) = controller(
        FakeRuntime::new()
            .with_log(vec![chunk("partial ")])
            .fail_at(Failpoint::LogStream),
    );

    let result = controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert!(result.log.is_degraded());
    assert_eq!(result.combined_log(), "partial ");
    assert!(matches!(result.log.cause(), Some(DockrunError::LogFetch { .. })));
    assert_eq!(runtime.removals().len(), 1);
}

#[tokio::test]
async fn log_open_failure_degrades_with_empty_log() {
    let (controller, _runtime) = controller(FakeRuntime::new().fail_at(Failpoint::Logs));

    let result = controller
        .run_and_clean(RunSpec::new("alpine"))
        .await
        .unwrap();

    assert!(result.log.is_degraded());
    assert_eq!(result.combined_log(), "");
}

#[tokio::test]
async fn stalled_log_keeps_partial_output_after_timeout() {
    let (controller, _runtime) = controller(
        FakeRuntime::new()
            .with_log(vec![chunk("first line\n")])
            .with_log_stall(),
    );
    let handle = controller.create(&RunSpec::new("alpine")).await.unwrap();

    let err = controller
        .fetch_log_with_timeout(&handle, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, DockrunError::Timeout { operation: "container_logs", .. }));

    let options = DockrunOptions {
        log_timeout_secs: 0,
        ..Default::default()
    };
    let (controller, _runtime) = controller_with(
        FakeRuntime::new()
            .with_log(vec![chunk("first line\n")])
            .with_log_stall(),
        options,
    );
    let result = controller.run_and_clean(RunSpec::new("alpine")).await.unwrap();
    assert!(matches!(result.log.cause(), Some(DockrunError::Timeout { .. })));
    assert_eq!(result.combined_log(), "first line\n");
}

#[tokio::test]
async fn fetch_log_returns_combined_output() {
    let (controller, _runtime) = controller(FakeRuntime::new().with_log(vec![
        OutputChunk::Stdout(b"out\n".to_vec()),
        OutputChunk::Stderr(b"err\n".to_vec()),
    ]));
    let handle = controller.create(&RunSpec::new("alpine")).await.unwrap();

    assert_eq!(controller.fetch_log(&handle).await.unwrap(), "out\nerr\n");
}

// ============================================================================
// PRIMITIVES
// ============================================================================

#[tokio::test]
async fn create_reports_handle_when_start_fails() {
    let (controller, runtime) = controller(FakeRuntime::new().fail_at(Failpoint::Start));

    let err = controller.create(&RunSpec::new("alpine")).await.unwrap_err();
    assert_eq!(err.handle, Some(ContainerHandle::new("fake-0001")));
    assert!(runtime.removals().is_empty());

    let err: DockrunError = err.into();
    assert!(matches!(err, DockrunError::Start { .. }));
}

#[tokio::test]
async fn remove_twice_returns_error_the_second_time() {
    let (controller, _runtime) = controller(FakeRuntime::new());
    let handle = controller.create(&RunSpec::new("alpine")).await.unwrap();
    controller.wait(&handle).await.unwrap();

    assert!(controller.remove(&handle).await.is_none());
    let err = controller.remove(&handle).await;
    assert!(matches!(err, Some(DockrunError::Remove { .. })));
}

#[tokio::test]
async fn remove_refuses_a_running_container() {
    let (controller, runtime) = controller(FakeRuntime::new());
    let handle = controller.run_detached(RunSpec::new("nginx")).await.unwrap();

    let err = controller.remove(&handle).await;
    assert!(matches!(err, Some(DockrunError::Remove { .. })));
    assert_eq!(runtime.forced_removals(), [false]);
    assert_eq!(runtime.containers(), vec!["fake-0001"]);
}

#[tokio::test]
async fn ensure_image_pulls() {
    let (controller, runtime) = controller(FakeRuntime::new());

    controller.ensure_image("alpine:3.19").await.unwrap();
    assert_eq!(runtime.calls(), vec![Call::PullImage("alpine:3.19".into())]);
}

#[tokio::test]
async fn ensure_image_rejects_empty_reference() {
    let (controller, runtime) = controller(FakeRuntime::new());

    let err = controller.ensure_image("  ").await.unwrap_err();
    assert!(matches!(err, DockrunError::InvalidArgument(_)));
    assert!(runtime.calls().is_empty());
}

// ============================================================================
// DETACHED
// ============================================================================

#[tokio::test]
async fn run_detached_leaves_container_running() {
    let (controller, runtime) = controller(FakeRuntime::new());

    let handle = controller
        .run_detached(RunSpec::new("nginx"))
        .await
        .unwrap();

    assert_eq!(handle.id(), "fake-0001");
    assert!(!runtime.creates()[0].tty);
    assert!(runtime.removals().is_empty());
    assert_eq!(runtime.count(|c| matches!(c, Call::WaitContainer(_))), 0);
    assert_eq!(runtime.containers(), vec!["fake-0001"]);
}

#[tokio::test]
async fn stop_container_returns_log_then_removes() {
    let (controller, runtime) = controller(FakeRuntime::new().with_log(vec![chunk("bye\n")]));
    let handle = controller.run_detached(RunSpec::new("nginx")).await.unwrap();

    let log = controller.stop_container(&handle).await.unwrap();
    assert_eq!(log, "bye\n");
    assert_eq!(runtime.forced_removals(), [true]);
    assert!(runtime.containers().is_empty());
}

#[tokio::test]
async fn stop_container_surfaces_remove_failure() {
    let (controller, _runtime) = controller(FakeRuntime::new().fail_at(Failpoint::Remove));
    let handle = controller.run_detached(RunSpec::new("nginx")).await.unwrap();

    let err = controller.stop_container(&handle).await.unwrap_err();
    assert!(matches!(err, DockrunError::Remove { .. }));
}

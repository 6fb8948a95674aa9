//! Integration tests for the container inventory.

use dockrun::{DockrunError, RunSpec};
use dockrun_test_utils::{FakeRuntime, Failpoint, controller};

#[tokio::test]
async fn list_returns_ids_in_runtime_order() {
    let (controller, _runtime) =
        controller(FakeRuntime::new().with_containers(["abc123", "def456"]));

    assert_eq!(controller.list().await.unwrap(), vec!["abc123", "def456"]);
}

#[tokio::test]
async fn list_with_nothing_running_is_empty() {
    let (controller, _runtime) = controller(FakeRuntime::new());

    assert!(controller.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_failure_is_recoverable() {
    let (controller, _runtime) = controller(FakeRuntime::new().fail_at(Failpoint::List));

    let err = controller.list().await.unwrap_err();
    assert!(matches!(err, DockrunError::List(_)));
    assert_eq!(err.operation(), "list_containers");
}

#[tokio::test]
async fn detached_container_appears_in_list() {
    let (controller, _runtime) = controller(FakeRuntime::new().with_containers(["existing"]));

    let handle = controller.run_detached(RunSpec::new("nginx")).await.unwrap();
    let ids = controller.list().await.unwrap();

    assert_eq!(ids, vec!["existing".to_string(), handle.id().to_string()]);
}

#[test]
fn blocking_facade_runs_without_caller_runtime() {
    let runtime = std::sync::Arc::new(FakeRuntime::new().with_containers(["abc123"]));
    let controller =
        dockrun::blocking::Controller::with_runtime(runtime.clone(), Default::default()).unwrap();

    assert_eq!(controller.list().unwrap(), vec!["abc123"]);
    let result = controller.run_and_clean(RunSpec::new("alpine")).unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(runtime.removals().len(), 1);
}

#![allow(dead_code)]

use assert_cmd::Command;
use std::time::Duration;

/// Nothing listens here, so every daemon call fails fast.
pub const UNREACHABLE_HOST: &str = "tcp://127.0.0.1:9";

pub fn dockrun() -> Command {
    let bin_path: &str = env!("CARGO_BIN_EXE_dockrun");
    let mut cmd = Command::new(bin_path);
    // You can override this with .timeout(Duration::from_secs(N))
    cmd.timeout(Duration::from_secs(30));
    cmd.env_remove("DOCKER_HOST");
    cmd.env_remove("DOCKRUN_LOG_TIMEOUT_SECS");
    cmd.env_remove("DOCKRUN_EXEC_TIMEOUT_SECS");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A command pointed at a host where no daemon runs.
pub fn dockrun_offline() -> Command {
    let mut cmd = dockrun();
    cmd.args(["--host", UNREACHABLE_HOST]);
    cmd
}

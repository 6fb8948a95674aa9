use std::io::Write;
use std::time::Duration;

use clap::Args;
use dockrun::ContainerHandle;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Give up after this many seconds
    #[arg(long, value_name = "SECS", env = "DOCKRUN_EXEC_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Container ID
    pub container: String,

    /// Command and arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Returns the exit code of the executed command.
pub async fn execute(args: ExecArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<i64> {
    let controller = global.create_controller().await?;
    let handle = ContainerHandle::new(args.container);

    let result = controller
        .exec_with_deadline(&handle, args.command, args.timeout.map(Duration::from_secs))
        .await?;

    std::io::stdout().write_all(result.stdout.as_bytes())?;
    std::io::stderr().write_all(result.stderr.as_bytes())?;
    std::io::stdout().flush()?;
    Ok(result.exit_code)
}

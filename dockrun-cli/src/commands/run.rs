use std::io::Write;

use clap::Args;
use dockrun::{RunSpec, VolumeMount};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Bind mount a host path into the container (HOST:TARGET)
    #[arg(short = 'v', long = "volume", value_name = "HOST:TARGET")]
    pub volumes: Vec<VolumeMount>,

    /// Leave the container running and print its id
    #[arg(short, long)]
    pub detach: bool,

    /// Pull the image before creating the container
    #[arg(long)]
    pub pull: bool,

    /// Image to run
    pub image: String,

    /// Command and arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Returns the container's exit code (0 for detached runs).
pub async fn execute(args: RunArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<i64> {
    let controller = global.create_controller().await?;

    if args.pull {
        controller.ensure_image(&args.image).await?;
    }

    let spec = RunSpec::new(args.image)
        .args(args.command)
        .mounts(args.volumes);

    if args.detach {
        let handle = controller.run_detached(spec).await?;
        println!("{}", handle);
        return Ok(0);
    }

    let result = controller.run_and_clean(spec).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(result.combined_log().as_bytes())?;
    stdout.flush()?;

    if let Some(cause) = result.log.cause() {
        eprintln!("Warning: log incomplete: {}", cause);
    }
    Ok(result.exit_code)
}

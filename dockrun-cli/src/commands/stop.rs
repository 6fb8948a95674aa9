use clap::Args;
use dockrun::ContainerHandle;

#[derive(Args, Debug)]
pub struct StopArgs {
    /// ID of the container(s) to stop
    #[arg(required = true, num_args = 1..)]
    pub targets: Vec<String>,
}

pub async fn execute(args: StopArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let controller = global.create_controller().await?;

    let mut errors = Vec::new();
    for target in args.targets {
        match controller.stop_container(&ContainerHandle::new(target.as_str())).await {
            Ok(log) => print!("{}", log),
            Err(e) => {
                eprintln!("Error stopping container '{}': {}", target, e);
                errors.push(target);
            }
        }
    }

    if !errors.is_empty() {
        anyhow::bail!("Failed to stop: {}", errors.join(", "));
    }
    Ok(())
}

use clap::Args;
use dockrun::ContainerHandle;

#[derive(Args, Debug)]
pub struct RmArgs {
    /// ID of the container(s) to remove
    #[arg(required = true, num_args = 1..)]
    pub targets: Vec<String>,
}

pub async fn execute(args: RmArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let controller = global.create_controller().await?;

    let mut active_error = false;
    for target in args.targets {
        if let Some(e) = controller.remove(&ContainerHandle::new(target.as_str())).await {
            eprintln!("Error removing container '{}': {}", target, e);
            active_error = true;
        } else {
            println!("{}", target);
        }
    }

    if active_error {
        anyhow::bail!("Some containers could not be removed");
    }
    Ok(())
}

use clap::Args;

#[derive(Args, Debug)]
pub struct PsArgs {
    /// Only print the number of running containers
    #[arg(short, long)]
    pub count: bool,
}

pub async fn execute(args: PsArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let controller = global.create_controller().await?;
    let ids = controller.list().await?;

    if args.count {
        println!("{}", ids.len());
        return Ok(());
    }

    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

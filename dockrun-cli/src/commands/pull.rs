use clap::Args;

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Image reference (name[:tag] or name@digest)
    pub image: String,
}

pub async fn execute(args: PullArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let controller = global.create_controller().await?;
    controller.ensure_image(&args.image).await?;
    println!("{}", args.image);
    Ok(())
}

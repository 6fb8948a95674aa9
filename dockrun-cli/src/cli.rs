use clap::{Args, Parser, Subcommand};
use dockrun::{Controller, DockrunOptions, Endpoint};

use crate::commands::{exec, ps, pull, rm, run, stop};

#[derive(Parser, Debug)]
#[command(
    name = "dockrun",
    version,
    about = "Run one-shot containers and exec sessions against a Docker daemon"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull an image
    Pull(pull::PullArgs),

    /// Run a command in a new container and remove it afterwards
    Run(run::RunArgs),

    /// Run a command in a running container
    Exec(exec::ExecArgs),

    /// List running containers
    Ps(ps::PsArgs),

    /// Print a container's log, then remove it
    Stop(stop::StopArgs),

    /// Remove one or more containers
    Rm(rm::RmArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Daemon endpoint, e.g. unix:///var/run/docker.sock or tcp://host:2375.
    /// Defaults to DOCKER_HOST, then the local socket
    #[arg(long, global = true, value_name = "URI")]
    pub host: Option<Endpoint>,

    /// Upper bound for fetching a container log, in seconds
    #[arg(long, global = true, value_name = "SECS", env = "DOCKRUN_LOG_TIMEOUT_SECS")]
    pub log_timeout: Option<u64>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalFlags {
    pub fn options(&self) -> anyhow::Result<DockrunOptions> {
        let mut options = DockrunOptions::from_env()?;
        if let Some(endpoint) = &self.host {
            options.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.log_timeout {
            options.log_timeout_secs = secs;
        }
        Ok(options)
    }

    pub async fn create_controller(&self) -> anyhow::Result<Controller> {
        Ok(Controller::connect(self.options()?).await?)
    }

    pub fn log_directive(&self) -> &'static str {
        if self.debug { "debug" } else { "warn,dockrun=info" }
    }
}

//! Docker Engine implementation of [`RuntimeApi`].

use super::connection;
use super::{CreateRequest, ExecInspection, OutputChunk, OutputStream, RuntimeApi};
use crate::util::split_image_reference;
use crate::volumes::BindMount;
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use dockrun_shared::{DockrunError, DockrunResult, Endpoint};
use futures::{StreamExt, future};

/// Runtime client backed by a single Docker daemon connection.
///
/// Cloning is cheap; all clones share the underlying connection pool, so
/// log streaming and exec attachment can run next to a pending wait.
#[derive(Clone, Debug)]
pub struct DockerClient {
    docker: Docker,
    endpoint: Endpoint,
}

impl DockerClient {
    /// Connect to the runtime and verify it answers.
    pub async fn connect(endpoint: Endpoint, timeout_secs: u64) -> DockrunResult<Self> {
        let docker = connection::connect(&endpoint, timeout_secs).await?;
        Ok(Self { docker, endpoint })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl RuntimeApi for DockerClient {
    async fn pull_image(&self, image: &str) -> DockrunResult<()> {
        let (repository, tag) = split_image_reference(image);
        let options = CreateImageOptions {
            from_image: repository.to_string(),
            tag: tag.to_string(),
            ..Default::default()
        };

        let mut progress = self.docker.create_image(Some(options), None, None);
        while let Some(info) = progress.next().await {
            let info = info.map_err(|e| DockrunError::Image {
                image: image.to_string(),
                message: e.to_string(),
            })?;
            if let Some(status) = info.status {
                tracing::debug!(
                    image,
                    status = %status,
                    progress = info.progress.as_deref().unwrap_or_default(),
                    "Pull progress"
                );
            }
        }

        Ok(())
    }

    async fn create_container(&self, request: &CreateRequest) -> DockrunResult<String> {
        let mounts = if request.mounts.is_empty() {
            None
        } else {
            Some(
                request
                    .mounts
                    .iter()
                    .map(BindMount::to_runtime_mount)
                    .collect(),
            )
        };

        let config = Config {
            image: Some(request.image.clone()),
            cmd: if request.command.is_empty() {
                None
            } else {
                Some(request.command.clone())
            },
            tty: Some(request.tty),
            host_config: Some(HostConfig {
                mounts,
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await
            .map_err(|e| DockrunError::Create {
                image: request.image.clone(),
                message: e.to_string(),
            })?;

        for warning in &response.warnings {
            tracing::warn!(container_id = %response.id, "Create warning: {}", warning);
        }

        Ok(response.id)
    }

    async fn start_container(&self, container_id: &str) -> DockrunResult<()> {
        self.docker
            .start_container(container_id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| DockrunError::Start {
                container_id: container_id.to_string(),
                message: e.to_string(),
            })
    }

    async fn wait_container(&self, container_id: &str) -> DockrunResult<i64> {
        let mut waiter = self
            .docker
            .wait_container(container_id, None::<WaitContainerOptions<String>>);

        // The wait stream yields exactly one item: the exit status or the
        // error that ended the wait, whichever the daemon reports first.
        match waiter.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            Some(Err(BollardError::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(DockrunError::Wait {
                container_id: container_id.to_string(),
                message: e.to_string(),
            }),
            None => Err(DockrunError::Wait {
                container_id: container_id.to_string(),
                message: "wait stream ended without a status".to_string(),
            }),
        }
    }

    async fn container_logs(&self, container_id: &str) -> DockrunResult<OutputStream> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: "all".to_string(),
            ..Default::default()
        };

        let stream = self
            .docker
            .logs(container_id, Some(options))
            .filter_map(|item| future::ready(route_output(item)));

        Ok(stream.boxed())
    }

    async fn list_containers(&self) -> DockrunResult<Vec<String>> {
        let containers = self
            .docker
            .list_containers(None::<ListContainersOptions<String>>)
            .await
            .map_err(|e| DockrunError::List(e.to_string()))?;

        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> DockrunResult<()> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.docker
            .remove_container(container_id, Some(options))
            .await
            .map_err(|e| DockrunError::Remove {
                container_id: container_id.to_string(),
                message: e.to_string(),
            })
    }

    async fn create_exec(&self, container_id: &str, command: &[String]) -> DockrunResult<String> {
        let options = CreateExecOptions {
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            cmd: Some(command.to_vec()),
            ..Default::default()
        };

        let created = self
            .docker
            .create_exec(container_id, options)
            .await
            .map_err(|e| DockrunError::Exec {
                target: container_id.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(container_id, exec_id = %created.id, "Created exec context");
        Ok(created.id)
    }

    async fn start_exec(&self, exec_id: &str) -> DockrunResult<OutputStream> {
        let started = self
            .docker
            .start_exec(exec_id, None::<StartExecOptions>)
            .await
            .map_err(|e| DockrunError::Exec {
                target: exec_id.to_string(),
                message: e.to_string(),
            })?;

        match started {
            StartExecResults::Attached { output, .. } => Ok(output
                .filter_map(|item| future::ready(route_output(item)))
                .boxed()),
            StartExecResults::Detached => Err(DockrunError::Exec {
                target: exec_id.to_string(),
                message: "exec started detached, no output to attach".to_string(),
            }),
        }
    }

    async fn inspect_exec(&self, exec_id: &str) -> DockrunResult<ExecInspection> {
        let inspection = self
            .docker
            .inspect_exec(exec_id)
            .await
            .map_err(|e| DockrunError::Exec {
                target: exec_id.to_string(),
                message: e.to_string(),
            })?;

        Ok(ExecInspection {
            running: inspection.running.unwrap_or(false),
            exit_code: inspection.exit_code,
        })
    }
}

/// Map a daemon frame onto the stream tag it carries. Stdin echoes are dropped.
fn route_output(item: Result<LogOutput, BollardError>) -> Option<DockrunResult<OutputChunk>> {
    match item {
        Ok(LogOutput::StdOut { message }) => Some(Ok(OutputChunk::Stdout(message.to_vec()))),
        Ok(LogOutput::StdErr { message }) => Some(Ok(OutputChunk::Stderr(message.to_vec()))),
        Ok(LogOutput::Console { message }) => Some(Ok(OutputChunk::Console(message.to_vec()))),
        Ok(LogOutput::StdIn { .. }) => None,
        Err(e) => Some(Err(DockrunError::Stream(e.to_string()))),
    }
}

//! Connection management.
//!
//! Converts an [`Endpoint`] into a runtime client and checks that the daemon
//! answers before handing it out.

use bollard::{API_DEFAULT_VERSION, Docker};
use dockrun_shared::{DockrunError, DockrunResult, Endpoint};

/// Connect to an endpoint and ping the daemon.
pub async fn connect(endpoint: &Endpoint, timeout_secs: u64) -> DockrunResult<Docker> {
    let docker = open(endpoint, timeout_secs)?;

    docker
        .ping()
        .await
        .map_err(|e| connection_error(endpoint, e))?;

    tracing::debug!(endpoint = %endpoint, "Connected to container runtime");
    Ok(docker)
}

/// Build the client for an endpoint without contacting the daemon.
fn open(endpoint: &Endpoint, timeout_secs: u64) -> DockrunResult<Docker> {
    let docker = match endpoint {
        Endpoint::Local => {
            tracing::debug!("Connecting via local defaults");
            Docker::connect_with_local_defaults()
        }
        Endpoint::Unix { socket_path } => {
            tracing::debug!("Connecting via Unix: {}", socket_path.display());
            Docker::connect_with_socket(
                &socket_path.to_string_lossy(),
                timeout_secs,
                API_DEFAULT_VERSION,
            )
        }
        Endpoint::Http { address } => {
            tracing::debug!("Connecting via HTTP: {}", address);
            Docker::connect_with_http(address, timeout_secs, API_DEFAULT_VERSION)
        }
    };

    let docker = docker.map_err(|e| connection_error(endpoint, e))?;

    // Local defaults carry their own timeout; align it with the configured one.
    Ok(docker.with_timeout(std::time::Duration::from_secs(timeout_secs)))
}

fn connection_error(endpoint: &Endpoint, err: bollard::errors::Error) -> DockrunError {
    DockrunError::Connection {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

//! Endpoint types for reaching the container runtime service.

use std::path::PathBuf;

/// Where the runtime daemon listens.
///
/// `Local` defers to the runtime client's own discovery (`DOCKER_HOST`,
/// then the platform default socket).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Endpoint {
    /// Platform defaults
    #[default]
    Local,

    /// Unix socket transport
    Unix { socket_path: PathBuf },

    /// Plain HTTP transport (`host:port`)
    Http { address: String },
}

impl Endpoint {
    /// Create a Unix socket endpoint.
    pub fn unix(socket_path: impl Into<PathBuf>) -> Self {
        Self::Unix {
            socket_path: socket_path.into(),
        }
    }

    /// Create an HTTP endpoint.
    pub fn http(address: impl Into<String>) -> Self {
        Self::Http {
            address: address.into(),
        }
    }

    /// Get the URI representation of this endpoint.
    pub fn to_uri(&self) -> String {
        match self {
            Endpoint::Local => "local".to_string(),
            Endpoint::Unix { socket_path } => format!("unix://{}", socket_path.display()),
            Endpoint::Http { address } => format!("tcp://{}", address),
        }
    }

    /// Parse an endpoint from a URI string.
    ///
    /// Accepts `unix://PATH`, `tcp://HOST:PORT`, `http://HOST:PORT` and
    /// `local` (or an empty string).
    pub fn from_uri(uri: &str) -> Result<Self, String> {
        let uri = uri.trim();
        if uri.is_empty() || uri == "local" {
            Ok(Self::Local)
        } else if let Some(path) = uri.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(format!("invalid endpoint URI '{}': missing socket path", uri));
            }
            Ok(Self::unix(path))
        } else if let Some(rest) = uri
            .strip_prefix("tcp://")
            .or_else(|| uri.strip_prefix("http://"))
        {
            let (host, port) = rest
                .rsplit_once(':')
                .ok_or_else(|| format!("invalid endpoint URI '{}': missing port", uri))?;
            port.parse::<u16>()
                .map_err(|e| format!("invalid port in '{}': {}", uri, e))?;
            if host.is_empty() {
                return Err(format!("invalid endpoint URI '{}': missing host", uri));
            }
            Ok(Self::http(rest))
        } else {
            Err(format!(
                "invalid endpoint URI '{}': expected unix://, tcp://, http:// or local",
                uri
            ))
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

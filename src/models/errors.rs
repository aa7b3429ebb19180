use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("RPC call {method} failed: {message}")]
    Call { method: &'static str, message: String },
    #[error("RPC call {method} returned no result for {target}")]
    EmptyResponse { method: &'static str, target: String },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to connect to node at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

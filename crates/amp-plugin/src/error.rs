use amp_pack::PackError;
use amp_store::StoreError;
use amp_tree::TreeError;
use amp_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    InvalidAddress(#[from] TypeError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot fetch resolution of type {0:?}")]
    UnsupportedResolution(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("plugin has been shut down")]
    ShutDown,

    #[error("local tarball fetch failed: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Returns `true` if the caller may retry the same operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Tree(e) => e.is_retryable(),
            Self::Store(StoreError::Timeout { .. }) => true,
            _ => false,
        }
    }
}

pub type PluginResult<T> = Result<T, PluginError>;

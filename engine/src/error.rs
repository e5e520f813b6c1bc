use scene_buffers::BufferError;

/// Error returned by [`crate::EngineCore`] operations.
///
/// Every variant is recoverable except [`EngineError::Initialization`], which
/// leaves the engine not-ready until the next successful `init`. A rejected
/// call never partially mutates engine state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Pools could not be allocated for the requested capacity.
    #[error("engine initialization failed: {0}")]
    Initialization(String),
    /// An input buffer did not match its record layout.
    #[error("malformed buffer: {0}")]
    MalformedBuffer(#[from] BufferError),
    /// A scalar argument or buffer field is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The call arrived before a successful `init`.
    #[error("engine not initialized")]
    NotReady,
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

//! Domain error types.
//!
//! Insufficient data is deliberately absent: a window longer than the series
//! yields undefined indicator values instead of an error.

/// Top-level error type for crossbench.
#[derive(Debug, thiserror::Error)]
pub enum CrossbenchError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("misaligned series {left} and {right}: {reason}")]
    MisalignedSeries {
        left: String,
        right: String,
        reason: String,
    },

    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrossbenchError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        CrossbenchError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn misaligned(
        left: impl Into<String>,
        right: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CrossbenchError::MisalignedSeries {
            left: left.into(),
            right: right.into(),
            reason: reason.into(),
        }
    }
}

impl CrossbenchError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            CrossbenchError::Io(_) => 1,
            CrossbenchError::InvalidConfiguration { .. }
            | CrossbenchError::ConfigParse { .. }
            | CrossbenchError::ConfigMissing { .. }
            | CrossbenchError::ConfigInvalid { .. } => 2,
            CrossbenchError::Data { .. } => 3,
            CrossbenchError::InvalidSeries { .. } | CrossbenchError::MisalignedSeries { .. } => 4,
        }
    }
}

impl From<&CrossbenchError> for std::process::ExitCode {
    fn from(err: &CrossbenchError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

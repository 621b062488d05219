//! Denoising errors

use mesh_common::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DenoiseError {
    /// `end < start`, a zero frame number, or a range with no available frames
    #[error("invalid frame range {start}-{end}: {reason}")]
    InvalidRange { start: u32, end: u32, reason: String },

    /// Non-positive sigma, even window, unknown kernel name, ...
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("denoising cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DenoiseError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DenoiseError> = std::result::Result<T, E>;

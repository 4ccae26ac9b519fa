use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the allowlist core.
///
/// A well-formed address that is simply absent from the tree is not an error;
/// see [`crate::Membership::NotEligible`].
#[derive(Debug, Error)]
pub enum AllowlistError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddressFormat { input: String, reason: String },

    #[error("cannot build a Merkle tree from an empty allowlist")]
    EmptyAllowlist,

    #[error("no allowlist tree has been published yet")]
    TreeNotBuilt,

    #[error("proof does not recompute to the expected root")]
    VerificationFailed,

    #[error("invalid hash {input:?}: expected 0x-prefixed 64 hex chars")]
    InvalidHash { input: String },

    #[error("failed to read allowlist {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON allowlist")]
    Json(#[from] serde_json::Error),
}

impl AllowlistError {
    pub(crate) fn invalid_address(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddressFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AllowlistError> = std::result::Result<T, E>;

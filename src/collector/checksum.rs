//! Grouping key for create payloads.

use sha2::{Digest, Sha256};

use super::error::CollectorError;
use super::input::{CreateInput, HostMerge};

/// Hex-encoded SHA-256 over the JSON rendering of `input` with its host list
/// emptied. Payloads that differ only in their hosts share a checksum. The
/// caller's value is left untouched.
///
/// # Errors
///
/// Returns [`CollectorError::Checksum`] when the payload cannot be serialised.
pub fn checksum<I: HostMerge>(input: &I) -> Result<String, CollectorError> {
    let mut probe = input.clone();
    probe.set_hosts(Vec::new());
    let bytes = serde_json::to_vec(&probe).map_err(|err| CollectorError::Checksum {
        message: err.to_string(),
    })?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

impl CreateInput {
    /// Grouping checksum of the wrapped payload; see [`checksum`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Checksum`] when the payload cannot be
    /// serialised.
    pub fn checksum(&self) -> Result<String, CollectorError> {
        match self {
            Self::Dedicated(input) => checksum(input),
            Self::Sbm(input) => checksum(input),
        }
    }
}

/// Abbreviated checksum for log fields.
pub(crate) fn short(checksum: &str) -> &str {
    checksum.get(..12).unwrap_or(checksum)
}

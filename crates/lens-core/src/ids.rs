//! ID prefixes and session identifiers.
//!
//! Result IDs are minted by the database (`res-` + 16 hex chars). Session IDs
//! are minted by the coordinator from 128 bits of OS randomness; nothing checks
//! the store for collisions.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const PREFIX_RESULT: &str = "res";
pub const PREFIX_SESSION: &str = "ses";

/// Number of random bytes in a freshly generated session ID.
const SESSION_ID_BYTES: usize = 16;

/// Identifier shared by every result produced by one coordinator run.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh session ID, e.g. `ses-4f1c…` (32 hex chars after the prefix).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if the OS random source is unavailable.
    pub fn generate() -> Result<Self, CoreError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        getrandom::fill(&mut bytes)
            .map_err(|e| CoreError::Other(anyhow::anyhow!("random source unavailable: {e}")))?;
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Ok(Self(format!("{PREFIX_SESSION}-{hex}")))
    }

    /// Wrap an externally supplied session ID.
    ///
    /// Any non-blank string is accepted so that IDs minted by older clients
    /// still resolve. Returns `None` for blank input, which callers treat as
    /// "no session".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

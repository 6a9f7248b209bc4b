//! # Change-Detection Gate
//!
//! Skips recompilation when the upstream tables have not changed.
//!
//! - The content hash is BLAKE3 over the raw table payloads, in table order
//! - The static output records it on its first line: `-- Hash: <hex>`
//! - A missing, empty or malformed sentinel reads as "no stored hash", which
//!   is always stale
//!
//! The gate itself does no I/O: callers pass the previous output text (if
//! any) and act on the returned [`GateDecision`].

use crate::rows::RawTables;
use std::fmt;

/// Prefix of the sentinel line.
pub const HASH_SENTINEL_PREFIX: &str = "-- Hash: ";

/// Length of a hex-encoded BLAKE3 digest.
pub const HASH_HEX_LEN: usize = 64;

// =============================================================================
// CONTENT HASH
// =============================================================================

/// Hex-encoded BLAKE3 digest of raw table payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash the payloads in their fetch order, as one concatenated stream.
    #[must_use]
    pub fn of(raw: &RawTables) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (_, payload) in raw.iter() {
            hasher.update(payload.as_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// Accept a non-empty run of lowercase hex digits. A truncated digest
    /// parses but never equals a freshly computed one.
    #[must_use]
    pub fn parse(hex: &str) -> Option<Self> {
        let well_formed = !hex.is_empty()
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(hex.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }

    /// The sentinel line recording this hash (no trailing newline).
    #[must_use]
    pub fn sentinel_line(&self) -> String {
        format!("{HASH_SENTINEL_PREFIX}{}", self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the hash recorded on the first line of a previous output.
#[must_use]
pub fn stored_hash(previous_output: &str) -> Option<ContentHash> {
    let first_line = previous_output.lines().next()?;
    let hex = first_line.strip_prefix(HASH_SENTINEL_PREFIX)?;
    ContentHash::parse(hex.trim_end())
}

// =============================================================================
// GATE
// =============================================================================

/// Whether the previous output matches the current tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale { stored: Option<ContentHash> },
}

impl Freshness {
    /// Compare a previous output (if one exists) against the current hash.
    #[must_use]
    pub fn assess(previous_output: Option<&str>, current: &ContentHash) -> Self {
        match previous_output.and_then(stored_hash) {
            Some(stored) if stored == *current => Self::Fresh,
            stored => Self::Stale { stored },
        }
    }

    #[must_use]
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// How the caller wants staleness handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Regenerate only when stale.
    #[default]
    Default,
    /// Regenerate unconditionally.
    Force,
    /// Report staleness, never write.
    CheckOnly,
}

/// What the caller must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Up to date; write nothing.
    Skip,
    /// Compile and replace the output.
    Write,
    /// Check mode, output is current (exit 0).
    ReportFresh,
    /// Check mode, output is out of date (exit 1).
    ReportStale,
}

impl GateDecision {
    #[must_use]
    pub fn decide(mode: RunMode, freshness: &Freshness) -> Self {
        match (mode, freshness.is_fresh()) {
            (RunMode::Force, _) => Self::Write,
            (RunMode::CheckOnly, true) => Self::ReportFresh,
            (RunMode::CheckOnly, false) => Self::ReportStale,
            (RunMode::Default, true) => Self::Skip,
            (RunMode::Default, false) => Self::Write,
        }
    }

    #[must_use]
    pub fn writes(self) -> bool {
        matches!(self, Self::Write)
    }
}

// =============================================================================
// TESTS
// =============================================================================

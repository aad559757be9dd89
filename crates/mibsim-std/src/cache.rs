//! Pipeline output caching with fingerprint support.
//!
//! The generator can skip type canonicalization and tree synthesis when the
//! compiled symbol files have not changed since the last run. The cache is
//! reused only while its embedded fingerprint matches the current inputs.
//!
//! # File Format
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (9 or 41 bytes)                 │
//! │   magic: [u8; 4]        "MSIM"         │
//! │   version: u32          Schema version │
//! │   has_fingerprint: u8   0 or 1         │
//! │   fingerprint: [u8; 32] (if present)   │
//! ├────────────────────────────────────────┤
//! │ Payload (JSON-encoded PipelineOutput)  │
//! └────────────────────────────────────────┘
//! ```

use mibsim_core::PipelineOutput;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Current schema version. Bump on any breaking change to the payload.
pub const SCHEMA_VERSION: u32 = 1;

/// Magic bytes identifying a mibsim cache file.
const MAGIC: [u8; 4] = *b"MSIM";

/// Header length without a fingerprint.
const HEADER_LEN: usize = 9;

/// Fingerprint length.
const FINGERPRINT_LEN: usize = 32;

/// Cache error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// File does not start with expected magic bytes.
    #[error("invalid magic bytes (expected MSIM)")]
    InvalidMagic,
    /// Schema version mismatch.
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version.
        expected: u32,
        /// Found version.
        found: u32,
    },
    /// Fingerprint does not match expected value.
    #[error("fingerprint mismatch")]
    FingerprintMismatch,
    /// Header is truncated.
    #[error("truncated header")]
    TruncatedHeader,
    /// Payload could not be encoded or decoded.
    #[error("payload encoding failed: {0}")]
    Payload(#[source] serde_json::Error),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Compute a fingerprint from input file contents.
///
/// Includes the schema version so a format change invalidates old caches.
/// Inputs are sorted by name.
pub fn compute_fingerprint<S: AsRef<str>>(inputs: &[(S, &[u8])]) -> [u8; 32] {
    let mut sorted: Vec<_> = inputs.iter().collect();
    sorted.sort_by_key(|(name, _)| name.as_ref());

    let mut hasher = Sha256::new();
    hasher.update(SCHEMA_VERSION.to_le_bytes());
    for (name, content) in sorted {
        hasher.update(name.as_ref().as_bytes());
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(content);
    }

    hasher.finalize().into()
}

/// Serialize pipeline output to cache bytes.
///
/// # Errors
///
/// Returns [`CacheError::Payload`] if the output cannot be encoded.
pub fn serialize_output(
    output: &PipelineOutput,
    fingerprint: Option<[u8; 32]>,
) -> Result<Vec<u8>, CacheError> {
    let payload = serde_json::to_vec(output).map_err(CacheError::Payload)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + FINGERPRINT_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    if let Some(fp) = fingerprint {
        bytes.push(1);
        bytes.extend_from_slice(&fp);
    } else {
        bytes.push(0);
    }
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parse the header, returning the stored fingerprint and payload offset.
fn parse_header(bytes: &[u8]) -> Result<(Option<[u8; 32]>, usize), CacheError> {
    if bytes.len() < HEADER_LEN {
        return Err(CacheError::TruncatedHeader);
    }
    if bytes[0..4] != MAGIC {
        return Err(CacheError::InvalidMagic);
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SCHEMA_VERSION {
        return Err(CacheError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: version,
        });
    }

    if bytes[8] == 0 {
        return Ok((None, HEADER_LEN));
    }
    let end = HEADER_LEN + FINGERPRINT_LEN;
    let stored: [u8; 32] = bytes
        .get(HEADER_LEN..end)
        .and_then(|s| s.try_into().ok())
        .ok_or(CacheError::TruncatedHeader)?;
    Ok((Some(stored), end))
}

/// Deserialize pipeline output from cache bytes.
///
/// With `expected_fingerprint` set, a cache without a fingerprint or with a
/// different one is rejected.
///
/// # Errors
///
/// Returns an error if the header is invalid, the fingerprint does not
/// match, or the payload cannot be decoded.
pub fn deserialize_output(
    bytes: &[u8],
    expected_fingerprint: Option<&[u8; 32]>,
) -> Result<PipelineOutput, CacheError> {
    let (stored, payload_start) = parse_header(bytes)?;
    if let Some(expected) = expected_fingerprint {
        if stored.as_ref() != Some(expected) {
            return Err(CacheError::FingerprintMismatch);
        }
    }
    serde_json::from_slice(&bytes[payload_start..]).map_err(CacheError::Payload)
}

/// Get the fingerprint from cache bytes without decoding the payload.
///
/// # Errors
///
/// Returns an error if the header is invalid.
pub fn get_fingerprint(bytes: &[u8]) -> Result<Option<[u8; 32]>, CacheError> {
    parse_header(bytes).map(|(fp, _)| fp)
}

// === File-based convenience API ===

/// Save pipeline output to a cache file, creating parent directories.
///
/// # Errors
///
/// Returns an error if the output cannot be encoded or written.
pub fn save_cache<P: AsRef<Path>>(
    output: &PipelineOutput,
    path: P,
    fingerprint: Option<[u8; 32]>,
) -> Result<(), CacheError> {
    let path = path.as_ref();
    let bytes = serialize_output(output, fingerprint)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Load pipeline output from a cache file without fingerprint verification.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the cache is invalid.
pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<PipelineOutput, CacheError> {
    let bytes = fs::read(path)?;
    deserialize_output(&bytes, None)
}

/// Load pipeline output from a cache file with fingerprint verification.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the cache is invalid,
/// or the fingerprint doesn't match.
pub fn load_cache_verified<P: AsRef<Path>>(
    path: P,
    expected_fingerprint: &[u8; 32],
) -> Result<PipelineOutput, CacheError> {
    let bytes = fs::read(path)?;
    deserialize_output(&bytes, Some(expected_fingerprint))
}

/// Check if a cache file exists and has a matching fingerprint.
pub fn is_cache_valid<P: AsRef<Path>>(path: P, expected_fingerprint: &[u8; 32]) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };
    matches!(get_fingerprint(&bytes), Ok(Some(fp)) if fp == *expected_fingerprint)
}

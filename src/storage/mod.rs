//! Storage module: thin I/O glue around the validator
//!
//! Reads and writes newline-delimited descriptor batches, converts the
//! base64 blob form subscription tooling exchanges, and fetches remote
//! lists. No decision logic lives here; failures at this boundary are
//! real errors, unlike the drop signals inside the core.

use crate::Result;
use anyhow::{anyhow, Context};
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use std::fs;
use std::path::Path;

/// Read a newline-delimited descriptor batch from a file.
///
/// Lines are returned as-is (including blanks); the validator owns
/// trimming and empty-line handling.
pub fn read_descriptors<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {:?}", path.as_ref()))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Write a descriptor batch to a file, one descriptor per line
pub fn write_descriptors<P: AsRef<Path>>(path: P, descriptors: &[String]) -> Result<()> {
    fs::write(&path, descriptors.join("\n"))
        .with_context(|| format!("failed to write {:?}", path.as_ref()))?;
    Ok(())
}

/// Decode a base64 batch blob into descriptor lines.
///
/// Accepts standard or URL-safe alphabets and any line-ending convention
/// in the decoded content. Invalid base64 is an error: by contract the
/// core never sees this boundary failure.
pub fn decode_blob(blob: &str) -> Result<Vec<String>> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let decoded = STANDARD
        .decode(&compact)
        .or_else(|_| URL_SAFE.decode(&compact))
        .map_err(|e| anyhow!("invalid base64 batch blob: {}", e))?;
    let text = String::from_utf8(decoded).context("batch blob is not valid UTF-8")?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Encode descriptor lines as a base64 batch blob (newline-joined)
pub fn encode_blob(descriptors: &[String]) -> String {
    STANDARD.encode(descriptors.join("\n"))
}

/// Fetch a descriptor batch from a remote subscription URL.
///
/// Subscription endpoints commonly serve the whole list as one base64
/// blob; when the body decodes to descriptor-looking text it is unwrapped
/// transparently, otherwise the body is taken as plain lines.
pub async fn fetch_descriptors(url: &str) -> Result<Vec<String>> {
    let body = reqwest::get(url)
        .await
        .with_context(|| format!("failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("bad response from {}", url))?
        .text()
        .await
        .context("failed to read response body")?;

    if !body.contains("://") {
        if let Ok(lines) = decode_blob(&body) {
            if lines.iter().any(|line| line.contains("://")) {
                return Ok(lines);
            }
        }
    }

    Ok(body.lines().map(str::to_string).collect())
}

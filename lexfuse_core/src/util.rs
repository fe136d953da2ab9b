//! Hashing and text normalization shared by identity keys.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 content hash scoped by a namespace.
///
/// Concatenates the namespace and the text, then returns the hex-encoded digest.
#[must_use]
pub fn content_hash(namespace: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lowercase, turn punctuation into spaces and collapse whitespace.
///
/// Two spans that differ only in case, punctuation or spacing normalize to
/// the same string.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let lowered: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a proper name, dropping a leading article.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let normalized = normalize_text(name);
    if let Some(rest) = normalized.strip_prefix("the ") {
        return rest.to_string();
    }
    normalized
}

//! Inline metadata markers.
//!
//! A marker is a single line holding an HTML comment, so markdown renderers
//! that know nothing about it hide it:
//!
//! ```text
//! <!--OBOERU:{"v":1,"algo":"fsrs-6","reviewedAt":"…","dueAt":"…","s":2.31,"d":5.31,"rating":3,"reviews":1,"lapses":0}-->
//! ```

use crate::types::CardMeta;

pub const PREFIX: &str = "<!--OBOERU:";
pub const SUFFIX: &str = "-->";

/// Whether a line has the shape of a marker, regardless of its payload.
pub fn is_marker(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= PREFIX.len() + SUFFIX.len()
        && trimmed.starts_with(PREFIX)
        && trimmed.ends_with(SUFFIX)
}

/// Decode a marker line.
///
/// Foreign versions, other algorithms and broken payloads all decode to
/// `None`.
pub fn decode(line: &str) -> Option<CardMeta> {
    if !is_marker(line) {
        return None;
    }
    let trimmed = line.trim();
    let payload = trimmed[PREFIX.len()..trimmed.len() - SUFFIX.len()].trim();
    let meta: CardMeta = serde_json::from_str(payload).ok()?;
    meta.is_well_formed().then_some(meta)
}

/// Encode a record as a marker line (no line terminator).
///
/// The memory state must be finite: JSON has no representation for NaN or
/// infinity.
pub fn encode(meta: &CardMeta) -> String {
    debug_assert!(
        meta.s.is_finite() && meta.d.is_finite(),
        "non-finite memory state: s={} d={}",
        meta.s,
        meta.d
    );
    // Strings, finite numbers and a u8-backed enum always serialize.
    let payload = serde_json::to_string(meta).unwrap_or_default();
    format!("{PREFIX}{payload}{SUFFIX}")
}

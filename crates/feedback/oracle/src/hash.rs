//! Hash-slot reconciliation.
//!
//! Every `FUNC` block ends with a `HASH a b c` line whose three words are an
//! integrity hash over the block. Generated programs rarely get these right,
//! so they are normalized to a placeholder, the oracle computes the canonical
//! lines, and the canonical lines are patched back by position.

use regex::Regex;
use std::sync::LazyLock;

/// Canonical placeholder for an unknown hash.
pub const HASH_PLACEHOLDER: &str = "HASH 0x0000 0x0000 0x0000";

static HASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^HASH\s+0x[0-9a-fA-F]+\s+0x[0-9a-fA-F]+\s+0x[0-9a-fA-F]+$")
        .expect("hash line pattern is valid")
});

static HASH_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"HASH\s+0x[0-9a-fA-F]+\s+0x[0-9a-fA-F]+\s+0x[0-9a-fA-F]+")
        .expect("hash value pattern is valid")
});

/// One hash-slot line, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashSlot {
    /// Zero-based position among the slots of the text.
    pub index: usize,
    /// Byte range of the line within the text.
    pub start: usize,
    pub end: usize,
    pub line: String,
}

impl HashSlot {
    pub fn is_placeholder(&self) -> bool {
        self.line == HASH_PLACEHOLDER
    }
}

/// Rewrite every hash-slot line to [`HASH_PLACEHOLDER`]. Idempotent.
pub fn normalize(text: &str) -> String {
    HASH_LINE.replace_all(text, HASH_PLACEHOLDER).into_owned()
}

/// Whether the text still carries a placeholder slot.
pub fn has_placeholder(text: &str) -> bool {
    text.contains(HASH_PLACEHOLDER)
}

/// Ordered list of hash-slot lines.
pub fn extract_slots(text: &str) -> Vec<HashSlot> {
    HASH_LINE
        .find_iter(text)
        .enumerate()
        .map(|(index, m)| HashSlot {
            index,
            start: m.start(),
            end: m.end(),
            line: m.as_str().to_string(),
        })
        .collect()
}

/// Replace hash values with a bare `HASH` token, for comparing programs
/// regardless of their integrity hashes.
pub fn strip_hash_values(text: &str) -> String {
    HASH_VALUES.replace_all(text.trim(), "HASH").into_owned()
}

/// Result of reconciling a program with the oracle's canonical hash lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch {
    /// Slot counts matched; every slot replaced in order.
    Positional(String),
    /// Slot counts differed; the oracle output is used verbatim.
    Fallback {
        text: String,
        original_slots: usize,
        canonical_slots: usize,
    },
}

impl Patch {
    pub fn text(&self) -> &str {
        match self {
            Self::Positional(text) | Self::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Positional(text) | Self::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Patch canonical hash lines from `oracle_output` into `original`.
///
/// Correspondence is positional: the n-th slot of the original receives the
/// n-th canonical line. When the counts differ no correspondence can be
/// established and a partial patch could pair a hash with the wrong function,
/// so the oracle output is returned as-is.
pub fn patch(original: &str, oracle_output: &str) -> Patch {
    let original_slots = extract_slots(original);
    let canonical_slots = extract_slots(oracle_output);

    if original_slots.len() != canonical_slots.len() {
        return Patch::Fallback {
            text: oracle_output.to_string(),
            original_slots: original_slots.len(),
            canonical_slots: canonical_slots.len(),
        };
    }

    let mut patched = String::with_capacity(original.len());
    let mut cursor = 0;
    for (slot, canonical) in original_slots.iter().zip(&canonical_slots) {
        patched.push_str(&original[cursor..slot.start]);
        patched.push_str(&canonical.line);
        cursor = slot.end;
    }
    patched.push_str(&original[cursor..]);
    Patch::Positional(patched)
}

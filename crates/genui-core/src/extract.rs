//! Code extraction from free-form model responses
//!
//! Models are asked for a single fenced block but routinely wrap it in
//! commentary, or skip the fence altogether. Extraction is total: every input
//! maps to some code text.
//!
//! Policy: only the first fenced block is used. The first closing fence after
//! the opening line ends the block, even if it sits mid-line.

use regex::Regex;
use std::sync::OnceLock;

/// Opening fence of three or more backticks at the start of a line, optional
/// language hint, then the shortest run up to the next closing fence.
const FENCED_BLOCK: &str = r"(?m)^[ \t]*`{3,}[^\n`]*\r?\n((?s:.*?))`{3,}";

/// An opening fence line on its own, used to tell a truncated block apart
/// from plain unfenced text.
const OPENING_FENCE: &str = r"(?m)^[ \t]*`{3,}[^\n`]*$";

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FENCED_BLOCK).expect("fenced block pattern is valid"))
}

fn opening_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(OPENING_FENCE).expect("opening fence pattern is valid"))
}

/// How the code was located in the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// A complete fenced block was found; the code is its interior
    Fenced,
    /// An opening fence was found with no closing fence; the whole response
    /// was kept as code
    Unterminated,
    /// No fence at all; the whole response was kept as code
    Unfenced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub code: String,
    pub kind: Extraction,
}

/// Extract source code from a raw model response.
pub fn extract(raw: &str) -> String {
    extract_detailed(raw).code
}

/// Like [`extract`], but also reports which path produced the code.
pub fn extract_detailed(raw: &str) -> Extracted {
    if let Some(captures) = fenced_block().captures(raw) {
        let interior = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        return Extracted {
            code: interior.trim().to_string(),
            kind: Extraction::Fenced,
        };
    }

    let kind = if opening_fence().is_match(raw) {
        Extraction::Unterminated
    } else {
        Extraction::Unfenced
    };

    Extracted {
        code: raw.trim().to_string(),
        kind,
    }
}

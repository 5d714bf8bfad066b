use tabgroup_core::{Error, Result};

/// Errors carry at most this much of the offending text.
const EXCERPT_CHARS: usize = 500;

/// Recover a JSON value from model output that may bury the object in prose
/// or markdown fencing.
///
/// Strategy: strict parse of the whole text first; otherwise scan for a
/// candidate object span (fenced block before bare braces) and parse that.
/// A candidate that exists but does not parse is a different failure than no
/// candidate at all, and both are reported with a bounded excerpt.
pub fn recover_json(text: &str) -> Result<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Ok(v);
    }

    match fenced_object_span(trimmed).or_else(|| brace_span(trimmed)) {
        Some(span) => serde_json::from_str(span).map_err(|_| Error::Parse {
            excerpt: excerpt(text),
        }),
        None => Err(Error::NoJson {
            excerpt: excerpt(text),
        }),
    }
}

/// Innermost `{...}` span inside the first triple-backtick fence, if any.
fn fenced_object_span(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let mut body = &text[open + 3..];
    // Optional language tag on the opening fence.
    if let Some(rest) = body.strip_prefix("json") {
        body = rest;
    }
    let close = body.find("```")?;
    brace_span(&body[..close])
}

/// Greedy span from the first `{` to the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

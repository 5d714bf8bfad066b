use tabgroup_core::{CompletionResponse, Error, Result};

/// Pull the model's text out of whichever shape the upstream sent.
///
/// Accepted shapes, first match wins:
/// 1. a top-level `text` field holding a non-empty string,
/// 2. `candidates[0].content.parts[0].text`,
/// 3. the reply itself is a bare JSON string.
///
/// The failure carries the observed top-level keys only, never the payload.
pub fn response_text(resp: &CompletionResponse) -> Result<String> {
    let v = &resp.0;

    if let Some(t) = v.get("text").and_then(|x| x.as_str()) {
        if !t.is_empty() {
            return Ok(t.to_string());
        }
    }

    if let Some(t) = v
        .get("candidates")
        .and_then(|x| x.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .and_then(|p| p.first())
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
    {
        return Ok(t.to_string());
    }

    if let Some(t) = v.as_str() {
        return Ok(t.to_string());
    }

    Err(Error::Extraction {
        keys: top_level_keys(v),
    })
}

fn top_level_keys(v: &serde_json::Value) -> Vec<String> {
    match v.as_object() {
        Some(map) => map.keys().cloned().collect(),
        None => Vec::new(),
    }
}

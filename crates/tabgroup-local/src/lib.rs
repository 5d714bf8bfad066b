use tabgroup_core::{CompletionBackend, Error, Result, RetryPolicy, Tab, TabGroups};

pub mod extract;
pub mod gemini;
pub mod invoke;
pub mod prompt;
pub mod recover;

/// Run the whole grouping pipeline against an injected backend: build the
/// prompt, call the model (with retries), pull text out of whatever shape the
/// reply has, recover the JSON object from it, and check that it is one.
///
/// Fails fast at the first stage that cannot produce input for the next; no
/// partial result is ever returned.
pub async fn group_tabs(
    backend: &dyn CompletionBackend,
    model: &str,
    tabs: &[Tab],
    retry: &RetryPolicy,
) -> Result<TabGroups> {
    ensure_non_empty(tabs)?;
    tracing::debug!(tabs = tabs.len(), model, "grouping tabs");
    let req = prompt::build_request(model, tabs);
    let resp = invoke::complete_with_retry(backend, &req, retry).await?;
    let text = extract::response_text(&resp)?;
    let value = recover::recover_json(&text)?;
    let groups = into_groups(value)?;
    tracing::debug!(groups = groups.len(), "model grouped tabs");
    Ok(groups)
}

pub fn ensure_non_empty(tabs: &[Tab]) -> Result<()> {
    if tabs.is_empty() {
        return Err(Error::EmptyBatch);
    }
    Ok(())
}

/// Structural check only: the recovered value must be a JSON object. What the
/// model put under each category is passed through untouched.
pub fn into_groups(value: serde_json::Value) -> Result<TabGroups> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::NotAnObject {
            found: kind_of(&other).to_string(),
        }),
    }
}

fn kind_of(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

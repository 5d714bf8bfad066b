use tabgroup_core::{CompletionRequest, Tab};

/// Instruction block sent ahead of the tab listing. The model is told to
/// answer with a bare JSON object; recovery still tolerates fenced output
/// because models ignore that instruction often enough.
const INSTRUCTIONS: &str = "You organize browser tabs into topical groups.\n\
Group the tabs listed below by topic.\n\
Answer with a single raw JSON object mapping a short category name to the \
array of tab ids that belong to it, for example {\"News\": [2, 7]}.\n\
Do not wrap the JSON in markdown fences and do not add commentary.";

pub fn tab_line(tab: &Tab) -> String {
    format!("ID:{} | {} ({})", tab.id, tab.title, tab.url)
}

/// Deterministic: same batch, same prompt. Tabs are rendered in batch order.
pub fn build_prompt(tabs: &[Tab]) -> String {
    let mut out = String::with_capacity(INSTRUCTIONS.len() + tabs.len() * 64);
    out.push_str(INSTRUCTIONS);
    out.push_str("\n\nTabs:\n");
    for tab in tabs {
        out.push_str(&tab_line(tab));
        out.push('\n');
    }
    out
}

pub fn build_request(model: &str, tabs: &[Tab]) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        prompt: build_prompt(tabs),
    }
}

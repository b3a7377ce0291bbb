// Cross-cutting prompt fragments. Feature prompts live next to the feature
// (ai/prompts.rs, matching/prompts.rs).

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-form writing tasks.
pub const WRITER_SYSTEM: &str = "You are an experienced career coach and technical recruiter \
    who writes clear, professional, inclusive copy. \
    Respond with the requested text only, without preamble.";

/// Fills `{key}` placeholders in one pass over the template.
///
/// Substituted values are never rescanned, so user text containing `{...}`
/// comes through verbatim. Unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

use crate::llm_client::prompts::render;

/// Per-side character budget for resume and job text sent to the scorer.
pub const MATCH_EXCERPT_CHARS: usize = 1000;

pub const MATCH_SYSTEM: &str = "You are an expert ATS (Applicant Tracking System) and \
    Technical Recruiter. You MUST respond with a single valid JSON object only, \
    without markdown code fences or commentary.";

pub const MATCH_PROMPT_TEMPLATE: &str = r#"Job Description: "{job}"

Candidate Resume: "{resume}"

Analyze the match.
1. Assign a score from 0-100 based on keyword matching, experience, and relevance.
2. Provide a 1-sentence reasoning for the score.
3. List up to 3 critical keywords missing from the resume found in the JD.

Respond with JSON of the form:
{"score": <integer 0-100>, "reasoning": "<one sentence>", "missing_keywords": ["<keyword>", ...]}"#;

/// First `max_chars` characters of `text`, with a trailing ellipsis when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub fn build_match_prompt(resume_text: &str, job_text: &str) -> String {
    let job = excerpt(job_text, MATCH_EXCERPT_CHARS);
    let resume = excerpt(resume_text, MATCH_EXCERPT_CHARS);
    render(
        MATCH_PROMPT_TEMPLATE,
        &[("job", job.as_str()), ("resume", resume.as_str())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_keeps_short_text() {
        assert_eq!(excerpt("  React, TypeScript ", 1000), "React, TypeScript");
    }

    #[test]
    fn test_excerpt_cuts_on_char_boundary() {
        // '₹' is three bytes; a byte-based cut would panic here.
        let text = "₹₹₹₹₹";
        assert_eq!(excerpt(text, 2), "₹₹...");
    }

    #[test]
    fn test_prompt_truncates_both_sides() {
        let resume = "r".repeat(MATCH_EXCERPT_CHARS + 50);
        let job = "j".repeat(MATCH_EXCERPT_CHARS + 50);
        let prompt = build_match_prompt(&resume, &job);
        assert!(prompt.contains(&format!("{}...", "r".repeat(MATCH_EXCERPT_CHARS))));
        assert!(!prompt.contains(&"r".repeat(MATCH_EXCERPT_CHARS + 1)));
        assert!(!prompt.contains(&"j".repeat(MATCH_EXCERPT_CHARS + 1)));
    }

    #[test]
    fn test_placeholder_text_in_job_is_not_substituted() {
        let prompt = build_match_prompt(
            "SECRET RESUME",
            "Template engine job: write {resume} placeholders",
        );
        assert!(prompt.contains(r#"Job Description: "Template engine job: write {resume} placeholders""#));
        assert_eq!(prompt.matches("SECRET RESUME").count(), 1);
        assert!(prompt.contains(r#"{"score": <integer 0-100>"#));
    }
}

// Prompt templates for the AI writing features. Placeholders are `{name}`.

pub const RESUME_SUMMARY_PROMPT_TEMPLATE: &str = "\
Generate a professional 3-sentence resume summary for a candidate with the following \
experience: \"{experience}\" and skills: \"{skills}\". Focus on achievements and metrics.";

pub const RESUME_OPTIMIZE_PROMPT_TEMPLATE: &str = "\
Act as an expert ATS (Applicant Tracking System) optimizer.
Review this resume content: \"{resume}\" for the job title: \"{target_role}\".

Return a JSON object with exactly these keys:
- \"summary\": a strong professional summary (string)
- \"skills\": missing keywords/skills the candidate should add (array of strings)
- \"optimized_points\": 3 optimized bullet points improving the original content (array of strings)";

pub const JOB_DESCRIPTION_PROMPT_TEMPLATE: &str = "\
Write a compelling, inclusive job description for a \"{title}\" at \"{company}\".
Key requirements: {requirements}.
Include sections for: About Us, The Role, Requirements, and Why Join Us. Use Markdown formatting.";

pub const JOB_LISTINGS_PROMPT_TEMPLATE: &str = "\
You are a job aggregation agent. Produce {count} realistic, currently plausible job postings \
as they would appear on {platform} for the search keyword \"{keyword}\" in India.

Return a JSON array. Each element must have exactly these keys:
- \"title\" (string)
- \"company\" (string)
- \"location\" (string, city and country)
- \"salary\" (string, INR range such as \"₹12L - ₹20L\")
- \"type\" (one of \"Full-time\", \"Part-time\", \"Contract\", \"Remote\")
- \"description\" (string, 2-3 sentences)
- \"requirements\" (array of 3-5 short strings)";


#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::prompts::render;

    #[test]
    fn test_render_fills_all_placeholders() {
        let prompt = render(
            JOB_DESCRIPTION_PROMPT_TEMPLATE,
            &[
                ("title", "Senior Backend Engineer"),
                ("company", "StartupX"),
                ("requirements", "Python, Django, AWS"),
            ],
        );
        assert!(prompt.contains("\"Senior Backend Engineer\" at \"StartupX\""));
        assert!(prompt.contains("Key requirements: Python, Django, AWS."));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_listing_prompt_mentions_platform_and_count() {
        let prompt = render(
            JOB_LISTINGS_PROMPT_TEMPLATE,
            &[("count", "5"), ("platform", "Naukri.com"), ("keyword", "Data Scientist")],
        );
        assert!(prompt.contains("Produce 5 realistic"));
        assert!(prompt.contains("on Naukri.com"));
        assert!(prompt.contains("\"Data Scientist\""));
    }
}

// Résumé analysis prompt templates.

pub const ANALYSIS_SYSTEM: &str = "You are an expert resume analyzer.";

const RESUME_SLOT: &str = "{resume_text}";
const JOB_DESCRIPTION_SLOT: &str = "{job_description}";

pub const ANALYSIS_PROMPT: &str = "Analyze the resume against the job description.
Provide:
- Match Score (0-100)
- Key Qualifications Match
- Missing Skills
- Strengths
- Areas for Improvement
- Suggested Resume Improvements

Resume:
{resume_text}

Job Description:
{job_description}
";

/// Fills the analysis template with both inputs verbatim.
///
/// Substitution is a single left-to-right pass over the template, so braces or
/// slot names appearing inside the inputs are copied through untouched.
pub fn build_prompt(resume_text: &str, job_description: &str) -> String {
    let mut prompt =
        String::with_capacity(ANALYSIS_PROMPT.len() + resume_text.len() + job_description.len());
    let mut rest = ANALYSIS_PROMPT;

    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix(RESUME_SLOT) {
            prompt.push_str(resume_text);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(JOB_DESCRIPTION_SLOT) {
            prompt.push_str(job_description);
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}

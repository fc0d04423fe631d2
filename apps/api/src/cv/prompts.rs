// CV tailoring prompt templates.

pub const TAILOR_PERSONA: &str = "You are an expert CV writer who tailors an existing CV to a \
    specific job posting without inventing experience.";

/// Replace: {factual_instruction}, {job_description}, {cv_text}
pub const TAILOR_PROMPT: &str = r#"{factual_instruction}

Rewrite the CV below so it targets the job posting. You may reorder sections, rephrase bullets
to use the posting's vocabulary, tighten wording, and drop content that is irrelevant to the role.
You may NOT add employers, titles, dates, degrees, certifications, metrics or skills that the CV
does not already state.

JOB POSTING:
{job_description}

CURRENT CV:
{cv_text}

Return a JSON object with this EXACT schema:
{
  "tailored_cv": "the full rewritten CV as markdown",
  "changes": [
    {"section": "Experience", "summary": "Led with the payments migration, which matches the posting's focus"}
  ],
  "keywords_added": ["keywords from the posting that now appear in the CV"]
}

Rules:
1. keywords_added must be words or phrases copied from the JOB POSTING
2. Keep the candidate's contact details unchanged
3. One entry in "changes" per section you modified"#;

// LLM prompt constants for the applications module.

/// Persona for job-description keyword extraction.
pub const JOB_KEYWORDS_PERSONA: &str =
    "You are an expert recruiter who extracts the skills and qualifications a job posting screens for.";

/// Keyword extraction prompt. Replace `{job_description}` before sending.
pub const JOB_KEYWORDS_PROMPT: &str = r#"Extract the keywords a recruiter would screen CVs for from the job posting below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "keywords": [
    {"keyword": "PostgreSQL", "frequency": 3, "weight": 0.8}
  ],
  "seniority": "senior"
}

Rules:
- keyword: a skill, tool, language, certification or domain term, as written in the posting
- frequency: how many times the concept appears in the posting
- weight by where it appears:
  - title / header: 1.0
  - requirements ("Required", "Must have", "You bring"): 0.8
  - responsibilities ("You will", "Responsibilities"): 0.6
  - company description / benefits: 0.3
- seniority: "junior", "mid", "senior", "lead", "principal" or "unknown"
- At most 25 keywords. Skip generic words like "team", "communication" unless the posting stresses them.

JOB POSTING:
{job_description}"#;

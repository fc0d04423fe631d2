// Interview coaching prompt templates.

pub const COACH_PERSONA: &str = "You are a seasoned hiring manager and interview coach.";

/// Replace: {count}, {interview_type}, {role}, {company}, {job_description}
pub const QUESTIONS_PROMPT: &str = r#"Write {count} {interview_type} interview questions for a candidate applying for the role below.

ROLE: {role}
COMPANY: {company}
JOB POSTING (may be empty):
{job_description}

Return a JSON object:
{
  "questions": [
    {"question": "Tell me about a time you had to push back on a deadline.", "focus": "stakeholder management"}
  ]
}

Rules:
- Exactly {count} questions, ordered from warm-up to hardest
- "focus" names the competency the question probes, in 2-4 words
- Questions must be answerable without access to company-internal information"#;

/// Replace: {interview_type}, {role}, {question}, {focus}, {answer}
pub const FEEDBACK_PROMPT: &str = r#"Evaluate a candidate's answer in a {interview_type} interview for the role of {role}.

QUESTION: {question}
COMPETENCY PROBED: {focus}

CANDIDATE ANSWER:
{answer}

Return a JSON object:
{
  "feedback": "2-4 sentences of direct, constructive feedback",
  "score": 7,
  "strengths": ["what the answer did well"],
  "improvements": ["specific, actionable changes"]
}

Scoring (integer 1-10): 1-3 misses the question, 4-6 relevant but vague or unstructured,
7-8 structured with concrete evidence, 9-10 exceptional with measurable outcomes.
For behavioral questions reward the STAR structure (Situation, Task, Action, Result)."#;

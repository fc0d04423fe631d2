// Contract review prompt templates.

pub const CONTRACT_PERSONA: &str =
    "You are an employment lawyer reviewing a contract on behalf of the employee.";

/// Replace: {red_flags}, {contract_text}
pub const ANALYSIS_PROMPT: &str = r#"Review the employment contract below from the employee's point of view.

AUTOMATED SCAN FINDINGS (may be empty, verify each against the text):
{red_flags}

CONTRACT:
{contract_text}

Return a JSON object:
{
  "summary": "3-5 sentence plain-language summary of the contract",
  "clauses": [
    {
      "title": "Post-employment non-compete",
      "category": "non_compete",
      "risk": "high",
      "explanation": "What the clause means for the employee",
      "suggestion": "What to ask for instead"
    }
  ]
}

Rules:
- "category" is one of: non_compete, ip_assignment, arbitration, unilateral_amendment,
  termination, overtime, probation, compensation, confidentiality, benefits, other
- "risk" is one of: low, medium, high
- Only list clauses that actually appear in the contract text
- Do not give numeric risk scores; they are computed separately
- This is general information, not legal advice; say so in the summary"#;

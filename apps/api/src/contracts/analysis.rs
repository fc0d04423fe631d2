use serde::{Deserialize, Serialize};

use crate::contracts::prompts::{ANALYSIS_PROMPT, CONTRACT_PERSONA};
use crate::contracts::red_flags::{scan_red_flags, RedFlag};
use crate::contracts::scoring::{risk_score, Clause, RiskLevel};
use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{render_prompt, LlmClient};

pub const MIN_CONTRACT_LEN: usize = 200;
pub const MAX_CONTRACT_LEN: usize = 100_000;

#[derive(Debug, Deserialize)]
struct RawClause {
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    risk: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    suggestion: String,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    clauses: Vec<RawClause>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractAnalysis {
    pub summary: String,
    pub clauses: Vec<Clause>,
    pub red_flags: Vec<RedFlag>,
    pub risk_score: i32,
    pub overall_risk: RiskLevel,
}

pub fn validate_contract_text(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    let len = text.chars().count();
    if len < MIN_CONTRACT_LEN {
        return Err(AppError::Validation(format!(
            "contract_text must be at least {MIN_CONTRACT_LEN} characters"
        )));
    }
    if len > MAX_CONTRACT_LEN {
        return Err(AppError::Validation(format!(
            "contract_text must be at most {MAX_CONTRACT_LEN} characters"
        )));
    }
    Ok(text)
}

fn normalize_clause(raw: RawClause) -> Clause {
    let category = raw.category.trim().to_ascii_lowercase();
    Clause {
        title: raw.title.trim().to_string(),
        category: if category.is_empty() { "other".to_string() } else { category },
        risk: RiskLevel::parse(&raw.risk),
        explanation: raw.explanation.trim().to_string(),
        suggestion: raw.suggestion.trim().to_string(),
    }
}

fn describe_flags(flags: &[RedFlag]) -> String {
    if flags.is_empty() {
        return "none".to_string();
    }
    flags
        .iter()
        .map(|f| format!("- [{}] {}: \"{}\"", f.risk.as_str(), f.category, f.excerpt))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scores already-parsed clauses together with the scan result.
pub fn assemble(summary: String, clauses: Vec<Clause>, red_flags: Vec<RedFlag>) -> ContractAnalysis {
    let score = risk_score(&clauses, &red_flags);
    ContractAnalysis {
        summary,
        clauses,
        red_flags,
        risk_score: score,
        overall_risk: RiskLevel::from_score(score),
    }
}

pub async fn analyze_contract(llm: &LlmClient, contract_text: &str) -> Result<ContractAnalysis, AppError> {
    let red_flags = scan_red_flags(contract_text);
    let flags_text = describe_flags(&red_flags);
    let prompt = render_prompt(
        ANALYSIS_PROMPT,
        &[("red_flags", &flags_text), ("contract_text", contract_text)],
    );

    let raw: RawAnalysis = llm
        .call_json(&prompt, &json_system(CONTRACT_PERSONA))
        .await
        .map_err(|e| AppError::Llm(format!("Contract analysis failed: {e}")))?;

    let clauses = raw
        .clauses
        .into_iter()
        .filter(|c| !c.title.trim().is_empty() || !c.explanation.trim().is_empty())
        .map(normalize_clause)
        .collect();

    Ok(assemble(raw.summary.trim().to_string(), clauses, red_flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn contract() -> String {
        let mut text = "EMPLOYMENT AGREEMENT between Acme GmbH and the Employee. ".repeat(4);
        text.push_str("Disputes are resolved through binding arbitration in Delaware.");
        text
    }

    #[test]
    fn test_length_bounds() {
        assert!(validate_contract_text(&"a".repeat(199)).is_err());
        assert!(validate_contract_text(&"a".repeat(200)).is_ok());
        assert!(validate_contract_text(&"a".repeat(MAX_CONTRACT_LEN + 1)).is_err());
    }

    #[test]
    fn test_normalize_clause_defaults() {
        let clause = normalize_clause(RawClause {
            title: " Pay ".into(),
            category: "".into(),
            risk: "LOW".into(),
            explanation: "ok".into(),
            suggestion: "".into(),
        });
        assert_eq!(clause.title, "Pay");
        assert_eq!(clause.category, "other");
        assert_eq!(clause.risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_analyze_combines_llm_clauses_and_scan() {
        let server = MockServer::start().await;
        let body = json!({
            "summary": "Standard contract. Not legal advice.",
            "clauses": [{
                "title": "Salary", "category": "compensation", "risk": "low",
                "explanation": "Market rate", "suggestion": "None"
            }]
        });
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "model": "test",
                "content": [{"type": "text", "text": body.to_string()}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 10}
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::new("test-key".into()).unwrap().with_base_url(&server.uri());
        let analysis = analyze_contract(&llm, &contract()).await.unwrap();

        assert_eq!(analysis.clauses.len(), 1);
        assert_eq!(analysis.red_flags.len(), 1);
        // low clause (2) + uncovered arbitration flag (10)
        assert_eq!(analysis.risk_score, 12);
        assert_eq!(analysis.overall_risk, RiskLevel::Low);
    }
}

use serde::{Deserialize, Serialize};

use crate::contracts::red_flags::RedFlag;

pub const MAX_RISK_SCORE: i32 = 100;
const HIGH_THRESHOLD: i32 = 60;
const MEDIUM_THRESHOLD: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Unrecognised labels from the model count as medium.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn weight(&self) -> i32 {
        match self {
            RiskLevel::High => 25,
            RiskLevel::Medium => 10,
            RiskLevel::Low => 2,
        }
    }

    pub fn from_score(score: i32) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    pub title: String,
    pub category: String,
    pub risk: RiskLevel,
    pub explanation: String,
    pub suggestion: String,
}

/// Clause weights plus the weight of each red flag whose category no clause covers.
pub fn risk_score(clauses: &[Clause], red_flags: &[RedFlag]) -> i32 {
    let clause_total: i32 = clauses.iter().map(|c| c.risk.weight()).sum();
    let uncovered: i32 = red_flags
        .iter()
        .filter(|f| !clauses.iter().any(|c| c.category.eq_ignore_ascii_case(&f.category)))
        .map(|f| f.risk.weight())
        .sum();
    (clause_total + uncovered).min(MAX_RISK_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(category: &str, risk: RiskLevel) -> Clause {
        Clause {
            title: category.into(),
            category: category.into(),
            risk,
            explanation: String::new(),
            suggestion: String::new(),
        }
    }

    fn flag(category: &str, risk: RiskLevel) -> RedFlag {
        RedFlag {
            category: category.into(),
            excerpt: String::new(),
            risk,
        }
    }

    #[test]
    fn test_clause_weights_sum() {
        let clauses = [
            clause("non_compete", RiskLevel::High),
            clause("overtime", RiskLevel::Medium),
            clause("compensation", RiskLevel::Low),
        ];
        assert_eq!(risk_score(&clauses, &[]), 37);
    }

    #[test]
    fn test_covered_red_flag_not_double_counted() {
        let clauses = [clause("Non_Compete", RiskLevel::High)];
        let flags = [flag("non_compete", RiskLevel::High), flag("arbitration", RiskLevel::Medium)];
        assert_eq!(risk_score(&clauses, &flags), 35);
    }

    #[test]
    fn test_score_is_capped() {
        let clauses: Vec<Clause> = (0..6).map(|_| clause("termination", RiskLevel::High)).collect();
        assert_eq!(risk_score(&clauses, &[]), MAX_RISK_SCORE);
    }

    #[test]
    fn test_overall_risk_thresholds() {
        assert_eq!(RiskLevel::from_score(60), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(59), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(24), RiskLevel::Low);
    }

    #[test]
    fn test_parse_defaults_to_medium() {
        assert_eq!(RiskLevel::parse(" HIGH "), RiskLevel::High);
        assert_eq!(RiskLevel::parse("severe"), RiskLevel::Medium);
    }
}

//! Indicator scoring: how well a CV covers what a job posting screens for.
//!
//! Default: `KeywordIndicatorScorer` (pure-Rust, deterministic, fully testable).
//! `AppState` holds an `Arc<dyn IndicatorScorer>`.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::applications::job_parser::KeywordInventory;
use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorMatch {
    pub keyword: String,
    pub strength: f32, // 0.0 – 1.0
    pub evidence: String,
}

/// A posting keyword the CV does not cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorGap {
    pub keyword: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub overall_score: u32,                   // 0 – 100
    pub strong_matches: Vec<IndicatorMatch>,  // strength ≥ 0.8
    pub partial_matches: Vec<IndicatorMatch>, // 0.4 – 0.79
    pub gaps: Vec<IndicatorGap>,              // strength < 0.4
    pub recommendation: String,
    pub scorer_backend: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait IndicatorScorer: Send + Sync {
    async fn score(
        &self,
        cv_text: &str,
        inventory: &KeywordInventory,
    ) -> Result<IndicatorReport, AppError>;
}

/// Keyword coverage scorer. No LLM call.
///
/// 1. Per keyword: whole phrase present → 1.0, some token (≥3 chars) present → 0.5, else 0.0
/// 2. overall = Σ(strength × weighted_score) / Σ(weighted_score) × 100
/// 3. strong ≥ 0.8, partial ≥ 0.4, gap otherwise
pub struct KeywordIndicatorScorer;

#[async_trait]
impl IndicatorScorer for KeywordIndicatorScorer {
    async fn score(
        &self,
        cv_text: &str,
        inventory: &KeywordInventory,
    ) -> Result<IndicatorReport, AppError> {
        Ok(compute_keyword_indicators(cv_text, inventory))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Lowercased tokens; keeps `+`, `#` and `.` inside tokens so "c++", "c#" and "node.js" survive.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && haystack.windows(phrase.len()).any(|w| w == phrase)
}

fn keyword_strength(cv_tokens: &[String], cv_set: &HashSet<&str>, keyword: &str) -> (f32, String) {
    let kw_tokens = tokenize(keyword);
    if contains_phrase(cv_tokens, &kw_tokens) {
        return (1.0, format!("CV mentions \"{keyword}\""));
    }
    if kw_tokens.len() > 1 {
        if let Some(hit) = kw_tokens
            .iter()
            .find(|t| t.chars().count() >= 3 && cv_set.contains(t.as_str()))
        {
            return (0.5, format!("CV mentions \"{hit}\" only"));
        }
    }
    (0.0, String::new())
}

pub fn compute_keyword_indicators(cv_text: &str, inventory: &KeywordInventory) -> IndicatorReport {
    if inventory.keywords.is_empty() {
        return IndicatorReport {
            overall_score: 0,
            strong_matches: vec![],
            partial_matches: vec![],
            gaps: vec![],
            recommendation: "No keywords found in the job description, cannot score indicators."
                .to_string(),
            scorer_backend: "keyword".to_string(),
        };
    }

    let cv_tokens = tokenize(cv_text);
    let cv_set: HashSet<&str> = cv_tokens.iter().map(String::as_str).collect();

    let mut strong_matches = Vec::new();
    let mut partial_matches = Vec::new();
    let mut gaps = Vec::new();
    let mut total_weighted = 0.0_f32;
    let mut total_score = 0.0_f32;

    for kw in &inventory.keywords {
        let weighted = kw.weighted_score();
        total_weighted += weighted;

        let (strength, evidence) = keyword_strength(&cv_tokens, &cv_set, &kw.keyword);
        total_score += strength * weighted;

        let indicator = IndicatorMatch {
            keyword: kw.keyword.clone(),
            strength,
            evidence,
        };
        if strength >= 0.8 {
            strong_matches.push(indicator);
        } else if strength >= 0.4 {
            partial_matches.push(indicator);
        } else {
            gaps.push(IndicatorGap {
                keyword: kw.keyword.clone(),
                frequency: kw.frequency,
            });
        }
    }

    // Most-mentioned gaps first so the recommendation names what matters
    gaps.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let overall_score = if total_weighted > 0.0 {
        ((total_score / total_weighted) * 100.0).round().clamp(0.0, 100.0) as u32
    } else {
        0
    };

    IndicatorReport {
        overall_score,
        recommendation: build_recommendation(overall_score, &gaps),
        strong_matches,
        partial_matches,
        gaps,
        scorer_backend: "keyword".to_string(),
    }
}

fn build_recommendation(score: u32, gaps: &[IndicatorGap]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(|g| g.keyword.as_str()).collect();

    if score >= 80 {
        "Strong match. Your CV covers the key requirements of this posting.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate match ({score}/100). Consider tailoring your CV to mention: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Weak match ({score}/100). Missing: {}. Tailor your CV before applying.",
            top_gaps.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::job_parser::JobKeyword;

    fn inventory(keywords: &[(&str, u32, f32)]) -> KeywordInventory {
        KeywordInventory {
            keywords: keywords
                .iter()
                .map(|(k, f, w)| JobKeyword {
                    keyword: k.to_string(),
                    frequency: *f,
                    weight: *w,
                })
                .collect(),
            seniority: None,
        }
    }

    const CV: &str = "Senior engineer. Built Rust services on PostgreSQL and Kubernetes. \
                      Wrote C++ and C# tooling; maintained Node.js dashboards.";

    #[test]
    fn test_exact_matches_score_strong() {
        let report = compute_keyword_indicators(CV, &inventory(&[("Rust", 3, 0.8), ("PostgreSQL", 2, 0.8)]));
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.strong_matches.len(), 2);
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_symbol_languages_are_tokenized() {
        let report = compute_keyword_indicators(CV, &inventory(&[("C++", 1, 1.0), ("c#", 1, 1.0), ("node.js", 1, 1.0)]));
        assert_eq!(report.strong_matches.len(), 3);
    }

    #[test]
    fn test_partial_phrase_scores_partial() {
        let report = compute_keyword_indicators(CV, &inventory(&[("Kubernetes operators", 2, 0.6)]));
        assert_eq!(report.partial_matches.len(), 1);
        assert_eq!(report.overall_score, 50);
    }

    #[test]
    fn test_substring_is_not_a_match() {
        // "rust" must not match inside "trust"
        let report = compute_keyword_indicators("Built trust with clients", &inventory(&[("Rust", 1, 1.0)]));
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.overall_score, 0);
    }

    #[test]
    fn test_gaps_sorted_by_frequency() {
        let report = compute_keyword_indicators(
            CV,
            &inventory(&[("Kafka", 1, 0.8), ("Terraform", 4, 0.8), ("Rust", 2, 0.8)]),
        );
        assert_eq!(report.gaps[0].keyword, "Terraform");
        assert_eq!(report.gaps[1].keyword, "Kafka");
        assert!(report.recommendation.contains("Terraform"));
    }

    #[test]
    fn test_empty_inventory_scores_zero() {
        let report = compute_keyword_indicators(CV, &KeywordInventory::default());
        assert_eq!(report.overall_score, 0);
        assert!(report.recommendation.contains("No keywords"));
    }

    #[test]
    fn test_score_weighted_by_position() {
        // title keyword (1.0) matched, about-us keyword (0.3) missed
        let report = compute_keyword_indicators(CV, &inventory(&[("Rust", 1, 1.0), ("Scala", 1, 0.3)]));
        assert_eq!(report.overall_score, 77);
    }

    #[tokio::test]
    async fn test_trait_backend_label() {
        let report = KeywordIndicatorScorer
            .score(CV, &inventory(&[("Rust", 1, 1.0)]))
            .await
            .unwrap();
        assert_eq!(report.scorer_backend, "keyword");
    }
}

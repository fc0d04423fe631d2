//! Job-description parsing. Turns a posting into a weighted keyword inventory.

use serde::{Deserialize, Serialize};

use crate::applications::prompts::{JOB_KEYWORDS_PERSONA, JOB_KEYWORDS_PROMPT};
use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{render_prompt, LlmClient};

/// A single keyword from the posting, weighted by position and frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobKeyword {
    pub keyword: String,
    pub frequency: u32,
    /// title=1.0, requirements=0.8, responsibilities=0.6, about=0.3
    pub weight: f32,
}

impl JobKeyword {
    pub fn weighted_score(&self) -> f32 {
        self.frequency.max(1) as f32 * self.weight.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordInventory {
    pub keywords: Vec<JobKeyword>,
    #[serde(default)]
    pub seniority: Option<String>,
}

pub async fn parse_job_keywords(
    job_description: &str,
    llm: &LlmClient,
) -> Result<KeywordInventory, AppError> {
    let prompt = render_prompt(JOB_KEYWORDS_PROMPT, &[("job_description", job_description)]);
    let mut inventory: KeywordInventory = llm
        .call_json(&prompt, &json_system(JOB_KEYWORDS_PERSONA))
        .await
        .map_err(|e| AppError::Llm(format!("Job description parsing failed: {e}")))?;

    inventory.keywords.retain(|k| !k.keyword.trim().is_empty());
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_deserializes_without_seniority() {
        let json = r#"{"keywords": [{"keyword": "Rust", "frequency": 4, "weight": 0.8}]}"#;
        let inventory: KeywordInventory = serde_json::from_str(json).unwrap();
        assert_eq!(inventory.keywords.len(), 1);
        assert!(inventory.seniority.is_none());
    }

    #[test]
    fn test_weighted_score_is_frequency_times_weight() {
        let keyword = JobKeyword {
            keyword: "Rust".into(),
            frequency: 5,
            weight: 0.8,
        };
        assert!((keyword.weighted_score() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_weighted_score_clamps_bad_llm_values() {
        let keyword = JobKeyword {
            keyword: "Go".into(),
            frequency: 0,
            weight: 3.0,
        };
        assert!((keyword.weighted_score() - 1.0).abs() < f32::EPSILON);
    }
}

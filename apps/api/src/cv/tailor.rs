//! AI CV tailoring: base CV + job description → new tailored version.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::cv::prompts::{TAILOR_PERSONA, TAILOR_PROMPT};
use crate::errors::AppError;
use crate::llm_client::prompts::{json_system, FACTUAL_INSTRUCTION};
use crate::llm_client::{render_prompt, LlmClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvChange {
    pub section: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoredCv {
    pub tailored_cv: String,
    #[serde(default)]
    pub changes: Vec<CvChange>,
    #[serde(default)]
    pub keywords_added: Vec<String>,
}

/// Where the job description for a tailoring request comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    Inline(String),
    Application(Uuid),
}

/// Exactly one of `job_description` / `application_id` must be supplied.
pub fn resolve_job_source(
    job_description: Option<&str>,
    application_id: Option<Uuid>,
) -> Result<JobSource, AppError> {
    let inline = job_description.map(str::trim).filter(|s| !s.is_empty());
    match (inline, application_id) {
        (Some(text), None) => Ok(JobSource::Inline(text.to_string())),
        (None, Some(id)) => Ok(JobSource::Application(id)),
        (Some(_), Some(_)) => Err(AppError::Validation(
            "Provide either job_description or application_id, not both".to_string(),
        )),
        (None, None) => Err(AppError::Validation(
            "A job_description or an application_id with a job description is required"
                .to_string(),
        )),
    }
}

/// Keeps only keywords that actually occur in the posting (case-insensitive).
/// Returns `(kept, dropped)`.
pub fn filter_keywords(keywords: Vec<String>, job_description: &str) -> (Vec<String>, Vec<String>) {
    let haystack = job_description.to_lowercase();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for keyword in keywords {
        let needle = keyword.trim().to_lowercase();
        if !needle.is_empty() && haystack.contains(&needle) {
            if !kept.iter().any(|k: &String| k.to_lowercase() == needle) {
                kept.push(keyword.trim().to_string());
            }
        } else {
            dropped.push(keyword);
        }
    }
    (kept, dropped)
}

pub async fn tailor_cv(
    llm: &LlmClient,
    cv_text: &str,
    job_description: &str,
) -> Result<TailoredCv, AppError> {
    let prompt = render_prompt(
        TAILOR_PROMPT,
        &[
            ("factual_instruction", FACTUAL_INSTRUCTION),
            ("job_description", job_description),
            ("cv_text", cv_text),
        ],
    );

    let mut tailored: TailoredCv = llm
        .call_json(&prompt, &json_system(TAILOR_PERSONA))
        .await
        .map_err(|e| AppError::Llm(format!("CV tailoring failed: {e}")))?;

    if tailored.tailored_cv.trim().is_empty() {
        return Err(AppError::Llm("CV tailoring returned an empty CV".to_string()));
    }

    let (kept, dropped) = filter_keywords(std::mem::take(&mut tailored.keywords_added), job_description);
    if !dropped.is_empty() {
        warn!("Dropped keywords not present in the posting: {dropped:?}");
    }
    tailored.keywords_added = kept;
    Ok(tailored)
}

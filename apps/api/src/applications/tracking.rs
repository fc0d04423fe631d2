//! Create / update planning and pipeline statistics. Pure functions; the
//! handlers feed them rows and persist what they return.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::applications::status::ApplicationStatus;
use crate::applications::validation::{into_result, validate_application, ApplicationFields};
use crate::errors::AppError;
use crate::models::application::JobApplicationRow;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationRequest {
    pub company: String,
    pub position: String,
    pub status: Option<String>,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub applied_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial update; absent or null fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub applied_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// A validated application ready to be written.
#[derive(Debug, Clone)]
pub struct PlannedApplication {
    pub fields: ApplicationFields,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

pub fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    ApplicationStatus::parse(raw)
        .ok_or_else(|| AppError::Validation(format!("status: unknown value '{raw}'")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Moving to `applied` stamps `applied_at` unless one is already known.
fn stamp_applied_at(
    status: ApplicationStatus,
    applied_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, applied_at) {
        (ApplicationStatus::Applied, None) => Some(now),
        (_, existing) => existing,
    }
}

pub fn plan_create(
    request: CreateApplicationRequest,
    now: DateTime<Utc>,
) -> Result<PlannedApplication, AppError> {
    let status = match request.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => ApplicationStatus::Saved,
    };

    let fields = ApplicationFields {
        company: request.company.trim().to_string(),
        position: request.position.trim().to_string(),
        job_url: non_blank(request.job_url),
        job_description: non_blank(request.job_description),
        location: non_blank(request.location),
        salary_min: request.salary_min,
        salary_max: request.salary_max,
        notes: non_blank(request.notes),
    };
    into_result(validate_application(&fields))?;

    Ok(PlannedApplication {
        fields,
        status,
        applied_at: stamp_applied_at(status, request.applied_at, now),
    })
}

pub fn plan_update(
    existing: &JobApplicationRow,
    patch: UpdateApplicationRequest,
    now: DateTime<Utc>,
) -> Result<PlannedApplication, AppError> {
    let current = parse_status(&existing.status)?;
    let status = match patch.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => current,
    };
    if !current.can_transition(status) {
        return Err(AppError::Conflict(format!(
            "Cannot move an application from '{}' to '{}'",
            current.as_str(),
            status.as_str()
        )));
    }

    let fields = ApplicationFields {
        company: patch
            .company
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| existing.company.clone()),
        position: patch
            .position
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| existing.position.clone()),
        job_url: non_blank(patch.job_url).or_else(|| existing.job_url.clone()),
        job_description: non_blank(patch.job_description)
            .or_else(|| existing.job_description.clone()),
        location: non_blank(patch.location).or_else(|| existing.location.clone()),
        salary_min: patch.salary_min.or(existing.salary_min),
        salary_max: patch.salary_max.or(existing.salary_max),
        notes: non_blank(patch.notes).or_else(|| existing.notes.clone()),
    };
    into_result(validate_application(&fields))?;

    let applied_at = patch.applied_at.or(existing.applied_at);
    Ok(PlannedApplication {
        fields,
        status,
        applied_at: stamp_applied_at(status, applied_at, now),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    /// Share of sent applications (anything past `saved`) that got an employer response.
    pub response_rate: f64,
}

pub fn compute_stats(counts: &[(String, i64)]) -> ApplicationStats {
    let mut by_status: BTreeMap<String, i64> = ApplicationStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();

    let mut sent = 0;
    let mut responded = 0;
    for (raw, count) in counts {
        *by_status.entry(raw.clone()).or_insert(0) += count;
        match ApplicationStatus::parse(raw) {
            Some(ApplicationStatus::Saved) | None => {}
            Some(status) => {
                sent += count;
                if status.is_response() {
                    responded += count;
                }
            }
        }
    }

    let response_rate = if sent > 0 {
        ((responded as f64 / sent as f64) * 100.0).round() / 100.0
    } else {
        0.0
    };

    ApplicationStats {
        total: counts.iter().map(|(_, c)| c).sum(),
        by_status,
        response_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
    }

    fn create(status: Option<&str>) -> CreateApplicationRequest {
        CreateApplicationRequest {
            company: " Acme ".into(),
            position: "Engineer".into(),
            status: status.map(String::from),
            job_url: Some("".into()),
            job_description: None,
            location: None,
            salary_min: None,
            salary_max: None,
            applied_at: None,
            notes: None,
        }
    }

    fn row(status: &str) -> JobApplicationRow {
        JobApplicationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company: "Acme".into(),
            position: "Engineer".into(),
            status: status.into(),
            job_url: None,
            job_description: Some("Rust".into()),
            location: None,
            salary_min: Some(50_000),
            salary_max: None,
            applied_at: None,
            notes: None,
            indicator_score: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_create_defaults_to_saved_and_trims() {
        let planned = plan_create(create(None), now()).unwrap();
        assert_eq!(planned.status, ApplicationStatus::Saved);
        assert_eq!(planned.fields.company, "Acme");
        assert_eq!(planned.fields.job_url, None);
        assert_eq!(planned.applied_at, None);
    }

    #[test]
    fn test_create_as_applied_stamps_date() {
        let planned = plan_create(create(Some("applied")), now()).unwrap();
        assert_eq!(planned.applied_at, Some(now()));
    }

    #[test]
    fn test_create_rejects_unknown_status() {
        assert!(matches!(
            plan_create(create(Some("ghosted")), now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_from_terminal_is_conflict() {
        let patch = UpdateApplicationRequest {
            status: Some("interviewing".into()),
            ..Default::default()
        };
        assert!(matches!(
            plan_update(&row("rejected"), patch, now()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_update_validates_merged_fields() {
        // existing salary_min 50k; a lower max must fail on the merged view
        let patch = UpdateApplicationRequest {
            salary_max: Some(40_000),
            ..Default::default()
        };
        assert!(matches!(
            plan_update(&row("saved"), patch, now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_keeps_unspecified_fields() {
        let patch = UpdateApplicationRequest {
            status: Some("applied".into()),
            notes: Some("Sent via referral".into()),
            ..Default::default()
        };
        let planned = plan_update(&row("saved"), patch, now()).unwrap();
        assert_eq!(planned.status, ApplicationStatus::Applied);
        assert_eq!(planned.fields.job_description.as_deref(), Some("Rust"));
        assert_eq!(planned.fields.notes.as_deref(), Some("Sent via referral"));
        assert_eq!(planned.applied_at, Some(now()));
    }

    #[test]
    fn test_stats_response_rate() {
        let stats = compute_stats(&[
            ("saved".into(), 4),
            ("applied".into(), 3),
            ("interviewing".into(), 1),
            ("rejected".into(), 1),
            ("withdrawn".into(), 1),
        ]);
        assert_eq!(stats.total, 10);
        assert_eq!(stats.by_status["offer"], 0);
        assert_eq!(stats.by_status["saved"], 4);
        // 2 responses out of 6 sent
        assert!((stats.response_rate - 0.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.response_rate, 0.0);
        assert_eq!(stats.by_status.len(), ApplicationStatus::ALL.len());
    }
}

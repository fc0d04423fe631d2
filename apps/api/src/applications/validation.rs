//! Field validation for job applications. Collects every failing field
//! instead of stopping at the first.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_URL_LEN: usize = 2048;
pub const MAX_NOTES_LEN: usize = 10_000;
pub const MAX_DESCRIPTION_LEN: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// The user-editable fields of an application, after defaults and merges.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFields {
    pub company: String,
    pub position: String,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub notes: Option<String>,
}

pub fn validate_application(fields: &ApplicationFields) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (field, value) in [("company", &fields.company), ("position", &fields.position)] {
        if value.trim().is_empty() {
            errors.push(FieldError {
                field,
                message: "is required".to_string(),
            });
        } else if value.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError {
                field,
                message: format!("must be at most {MAX_NAME_LEN} characters"),
            });
        }
    }

    if let Some(url) = &fields.job_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(FieldError {
                field: "job_url",
                message: "must start with http:// or https://".to_string(),
            });
        } else if url.len() > MAX_URL_LEN {
            errors.push(FieldError {
                field: "job_url",
                message: format!("must be at most {MAX_URL_LEN} characters"),
            });
        }
    }

    for (field, value) in [("salary_min", fields.salary_min), ("salary_max", fields.salary_max)] {
        if matches!(value, Some(v) if v < 0) {
            errors.push(FieldError {
                field,
                message: "must not be negative".to_string(),
            });
        }
    }
    if let (Some(min), Some(max)) = (fields.salary_min, fields.salary_max) {
        if min > max {
            errors.push(FieldError {
                field: "salary_min",
                message: "must not exceed salary_max".to_string(),
            });
        }
    }

    if matches!(&fields.notes, Some(n) if n.chars().count() > MAX_NOTES_LEN) {
        errors.push(FieldError {
            field: "notes",
            message: format!("must be at most {MAX_NOTES_LEN} characters"),
        });
    }
    if matches!(&fields.job_description, Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN) {
        errors.push(FieldError {
            field: "job_description",
            message: format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        });
    }

    errors
}

/// Turns collected field errors into a single 400.
pub fn into_result(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::Validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ApplicationFields {
        ApplicationFields {
            company: "Acme".into(),
            position: "Backend Engineer".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_application_is_valid() {
        assert!(validate_application(&valid()).is_empty());
    }

    #[test]
    fn test_blank_company_and_position_both_reported() {
        let fields = ApplicationFields {
            company: "  ".into(),
            position: String::new(),
            ..Default::default()
        };
        let errors = validate_application(&fields);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "company");
        assert_eq!(errors[1].field, "position");
    }

    #[test]
    fn test_overlong_company() {
        let fields = ApplicationFields {
            company: "x".repeat(MAX_NAME_LEN + 1),
            ..valid()
        };
        let errors = validate_application(&fields);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at most"));
    }

    #[test]
    fn test_job_url_requires_http_scheme() {
        let fields = ApplicationFields {
            job_url: Some("ftp://jobs.example.com".into()),
            ..valid()
        };
        assert_eq!(validate_application(&fields)[0].field, "job_url");

        let fields = ApplicationFields {
            job_url: Some("https://jobs.example.com/42".into()),
            ..valid()
        };
        assert!(validate_application(&fields).is_empty());
    }

    #[test]
    fn test_salary_range_checks() {
        let inverted = ApplicationFields {
            salary_min: Some(90_000),
            salary_max: Some(60_000),
            ..valid()
        };
        assert_eq!(validate_application(&inverted)[0].message, "must not exceed salary_max");

        let negative = ApplicationFields {
            salary_min: Some(-1),
            ..valid()
        };
        assert_eq!(validate_application(&negative)[0].field, "salary_min");

        let equal = ApplicationFields {
            salary_min: Some(70_000),
            salary_max: Some(70_000),
            ..valid()
        };
        assert!(validate_application(&equal).is_empty());
    }

    #[test]
    fn test_notes_limit_counts_characters_not_bytes() {
        let fields = ApplicationFields {
            notes: Some("é".repeat(MAX_NOTES_LEN)),
            ..valid()
        };
        assert!(validate_application(&fields).is_empty());
    }

    #[test]
    fn test_into_result_joins_messages() {
        let err = into_result(validate_application(&ApplicationFields::default())).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("company: is required"));
                assert!(msg.contains("position: is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

//! Tier and feature catalogue plus the pure limit evaluation.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Pro,
    Premium,
}

impl Tier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "free" => Some(Tier::Free),
            "pro" => Some(Tier::Pro),
            "premium" => Some(Tier::Premium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Premium => "premium",
        }
    }
}

/// Metered features. Each has a monthly counter per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    ApplicationTracking,
    CvTailoring,
    InterviewCoaching,
    CompensationStrategy,
    ContractReview,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::ApplicationTracking,
        Feature::CvTailoring,
        Feature::InterviewCoaching,
        Feature::CompensationStrategy,
        Feature::ContractReview,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ApplicationTracking => "application_tracking",
            Feature::CvTailoring => "cv_tailoring",
            Feature::InterviewCoaching => "interview_coaching",
            Feature::CompensationStrategy => "compensation_strategy",
            Feature::ContractReview => "contract_review",
        }
    }
}

/// Monthly allowance; `None` = unlimited.
pub fn monthly_limit(tier: Tier, feature: Feature) -> Option<i64> {
    match (tier, feature) {
        (Tier::Premium, _) => None,
        (Tier::Pro, Feature::ApplicationTracking) => None,
        (Tier::Pro, _) => match feature {
            Feature::CvTailoring => Some(30),
            Feature::InterviewCoaching => Some(20),
            _ => Some(10),
        },
        (Tier::Free, Feature::ApplicationTracking) => Some(15),
        (Tier::Free, Feature::CvTailoring) => Some(3),
        (Tier::Free, Feature::InterviewCoaching) => Some(2),
        (Tier::Free, _) => Some(1),
    }
}

/// Outcome of a limit check. Returned as-is by `POST /api/subscription/check-limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageCheck {
    pub allowed: bool,
    pub feature: Feature,
    pub tier: Tier,
    pub used: i64,
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
}

/// With enforcement off (kill switch) every check passes and reports no limit.
pub fn evaluate_limit(tier: Tier, feature: Feature, used: i64, enforcement_enabled: bool) -> UsageCheck {
    let limit = if enforcement_enabled {
        monthly_limit(tier, feature)
    } else {
        None
    };

    match limit {
        None => UsageCheck {
            allowed: true,
            feature,
            tier,
            used,
            limit: None,
            remaining: None,
        },
        Some(limit) => UsageCheck {
            allowed: used < limit,
            feature,
            tier,
            used,
            limit: Some(limit),
            remaining: Some((limit - used).max(0)),
        },
    }
}

/// First day of the UTC calendar month containing `now`.
pub fn period_start(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive().with_day(1).unwrap_or_else(|| now.date_naive())
}

//! Deterministic negotiation numbers. The LLM is handed these and never picks its own.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_SALARY: f64 = 10_000_000.0;
pub const MAX_YEARS_EXPERIENCE: i64 = 60;
const STRONG_EXPERIENCE_YEARS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leverage {
    Strong,
    Moderate,
    Limited,
}

impl Leverage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Leverage::Strong => "strong",
            Leverage::Moderate => "moderate",
            Leverage::Limited => "limited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchors {
    pub target: i64,
    pub anchor: i64,
    pub walk_away: i64,
    pub best_competing: Option<i64>,
    pub leverage: Leverage,
}

pub fn validate_salary(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 || value >= MAX_SALARY {
        return Err(AppError::Validation(format!(
            "{field} must be greater than 0 and below {}",
            MAX_SALARY as i64
        )));
    }
    Ok(())
}

pub fn validate_currency(currency: &str) -> Result<(), AppError> {
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "currency must be a 3-letter ISO code such as EUR".to_string(),
        ));
    }
    Ok(())
}

// Rounded to whole units first so float noise (105_000.000001) does not add a step.
fn round_up_thousand(value: f64) -> i64 {
    ((value.round() / 1000.0).ceil() * 1000.0) as i64
}

fn round_down_thousand(value: f64) -> i64 {
    ((value.round() / 1000.0).floor() * 1000.0) as i64
}

/// `base` and every competing offer must already be validated.
pub fn compute_anchors(
    base: f64,
    competing: &[f64],
    target_salary: Option<f64>,
    years_experience: i64,
) -> Anchors {
    let best_competing = competing.iter().copied().fold(None, |best: Option<f64>, c| {
        Some(best.map_or(c, |b| b.max(c)))
    });
    let best = best_competing.unwrap_or(0.0);

    let target = target_salary.unwrap_or_else(|| (base * 1.10).max(best));
    let walk_away = round_down_thousand(base.max(best * 0.97));
    let anchor = round_up_thousand((target * 1.05).max(best * 1.03));

    let leverage = if competing.iter().any(|&c| c >= base) {
        Leverage::Strong
    } else if years_experience >= STRONG_EXPERIENCE_YEARS {
        Leverage::Moderate
    } else {
        Leverage::Limited
    };

    Anchors {
        target: target.round() as i64,
        anchor,
        walk_away,
        best_competing: best_competing.map(|b| b.round() as i64),
        leverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_without_competing_offers() {
        let a = compute_anchors(60_000.0, &[], None, 3);
        assert_eq!(a.target, 66_000);
        // 66_000 * 1.05 = 69_300 -> 70_000
        assert_eq!(a.anchor, 70_000);
        assert_eq!(a.walk_away, 60_000);
        assert_eq!(a.best_competing, None);
        assert_eq!(a.leverage, Leverage::Limited);
    }

    #[test]
    fn test_competing_offer_above_base_drives_numbers() {
        let a = compute_anchors(80_000.0, &[75_000.0, 95_000.0], None, 2);
        assert_eq!(a.best_competing, Some(95_000));
        assert_eq!(a.target, 95_000);
        // max(99_750, 97_850) -> 100_000
        assert_eq!(a.anchor, 100_000);
        // 95_000 * 0.97 = 92_150 -> 92_000
        assert_eq!(a.walk_away, 92_000);
        assert_eq!(a.leverage, Leverage::Strong);
    }

    #[test]
    fn test_explicit_target_is_used() {
        let a = compute_anchors(70_000.0, &[], Some(85_000.0), 7);
        assert_eq!(a.target, 85_000);
        // 89_250 -> 90_000
        assert_eq!(a.anchor, 90_000);
        assert_eq!(a.leverage, Leverage::Moderate);
    }

    #[test]
    fn test_low_explicit_target_follows_formula() {
        let a = compute_anchors(100_000.0, &[], Some(50_000.0), 1);
        assert_eq!(a.walk_away, 100_000);
        // 52_500 -> 53_000; the walk-away line is not applied to the anchor
        assert_eq!(a.anchor, 53_000);
    }

    #[test]
    fn test_salary_bounds() {
        assert!(validate_salary("base_salary", 50_000.0).is_ok());
        assert!(validate_salary("base_salary", 0.0).is_err());
        assert!(validate_salary("base_salary", -1.0).is_err());
        assert!(validate_salary("base_salary", 10_000_000.0).is_err());
        assert!(validate_salary("base_salary", f64::NAN).is_err());
    }

    #[test]
    fn test_currency_format() {
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("eur").is_err());
        assert!(validate_currency("EURO").is_err());
        assert!(validate_currency("€").is_err());
    }
}

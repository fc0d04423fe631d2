use serde::{Deserialize, Serialize};

use crate::compensation::anchors::{
    compute_anchors, validate_currency, validate_salary, Anchors, MAX_YEARS_EXPERIENCE,
};
use crate::compensation::prompts::{NEGOTIATOR_PERSONA, STRATEGY_PROMPT};
use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{render_prompt, LlmClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDetails {
    pub base_salary: f64,
    pub bonus: Option<f64>,
    pub equity: Option<String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRequest {
    pub role: String,
    pub location: Option<String>,
    pub years_experience: i64,
    pub current_offer: OfferDetails,
    pub target_salary: Option<f64>,
    #[serde(default)]
    pub competing_offers: Vec<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub application_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyNarrative {
    #[serde(default)]
    pub talking_points: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub email_template: String,
}

/// Stored in `compensation_strategies.strategy` and returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub anchors: Anchors,
    #[serde(flatten)]
    pub narrative: StrategyNarrative,
}

/// Every check runs before any IO; returns the request with `role` trimmed.
pub fn validate_request(mut request: StrategyRequest) -> Result<StrategyRequest, AppError> {
    request.role = request.role.trim().to_string();
    if request.role.is_empty() {
        return Err(AppError::Validation("role is required".to_string()));
    }
    if !(0..=MAX_YEARS_EXPERIENCE).contains(&request.years_experience) {
        return Err(AppError::Validation(format!(
            "years_experience must be between 0 and {MAX_YEARS_EXPERIENCE}"
        )));
    }
    validate_salary("current_offer.base_salary", request.current_offer.base_salary)?;
    if let Some(bonus) = request.current_offer.bonus {
        validate_salary("current_offer.bonus", bonus)?;
    }
    if let Some(target) = request.target_salary {
        validate_salary("target_salary", target)?;
    }
    for offer in &request.competing_offers {
        validate_salary("competing_offers", *offer)?;
    }
    validate_currency(&request.currency)?;
    Ok(request)
}

pub fn anchors_for(request: &StrategyRequest) -> Anchors {
    compute_anchors(
        request.current_offer.base_salary,
        &request.competing_offers,
        request.target_salary,
        request.years_experience,
    )
}

fn describe_offer(offer: &OfferDetails, currency: &str) -> String {
    let mut parts = vec![format!("base {} {currency}", offer.base_salary.round() as i64)];
    if let Some(bonus) = offer.bonus {
        parts.push(format!("bonus {} {currency}", bonus.round() as i64));
    }
    if let Some(equity) = offer.equity.as_deref().filter(|e| !e.trim().is_empty()) {
        parts.push(format!("equity {}", equity.trim()));
    }
    parts.join(", ")
}

pub async fn write_strategy(
    llm: &LlmClient,
    request: &StrategyRequest,
    anchors: &Anchors,
) -> Result<StrategyNarrative, AppError> {
    let competing = if request.competing_offers.is_empty() {
        "none".to_string()
    } else {
        request
            .competing_offers
            .iter()
            .map(|c| (c.round() as i64).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let years = request.years_experience.to_string();
    let target = anchors.target.to_string();
    let anchor = anchors.anchor.to_string();
    let walk_away = anchors.walk_away.to_string();
    let offer = describe_offer(&request.current_offer, &request.currency);

    let prompt = render_prompt(
        STRATEGY_PROMPT,
        &[
            ("role", &request.role),
            ("location", request.location.as_deref().unwrap_or("not specified")),
            ("years_experience", &years),
            ("currency", &request.currency),
            ("offer", &offer),
            ("competing", &competing),
            ("target", &target),
            ("anchor", &anchor),
            ("walk_away", &walk_away),
            ("leverage", anchors.leverage.as_str()),
        ],
    );

    llm.call_json(&prompt, &json_system(NEGOTIATOR_PERSONA))
        .await
        .map_err(|e| AppError::Llm(format!("Strategy generation failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> StrategyRequest {
        serde_json::from_value(json!({
            "role": "  Staff Engineer ",
            "years_experience": 9,
            "current_offer": {"base_salary": 120000, "equity": "0.1%"},
            "competing_offers": [125000]
        }))
        .unwrap()
    }

    #[test]
    fn test_currency_defaults_to_eur() {
        let r = validate_request(request()).unwrap();
        assert_eq!(r.currency, "EUR");
        assert_eq!(r.role, "Staff Engineer");
    }

    #[test]
    fn test_rejects_blank_role_and_bad_years() {
        let mut r = request();
        r.role = "  ".into();
        assert!(validate_request(r).is_err());

        let mut r = request();
        r.years_experience = 61;
        assert!(validate_request(r).is_err());

        let mut r = request();
        r.years_experience = -1;
        assert!(matches!(validate_request(r), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_competing_offer() {
        let mut r = request();
        r.competing_offers.push(0.0);
        assert!(matches!(validate_request(r), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_describe_offer() {
        let r = request();
        assert_eq!(describe_offer(&r.current_offer, "EUR"), "base 120000 EUR, equity 0.1%");
    }

    #[test]
    fn test_strategy_serializes_flat() {
        let r = request();
        let strategy = Strategy {
            anchors: anchors_for(&r),
            narrative: StrategyNarrative {
                talking_points: vec!["I have a competing offer".into()],
                risks: vec![],
                email_template: "Hi".into(),
            },
        };
        let value = serde_json::to_value(&strategy).unwrap();
        assert_eq!(value["anchors"]["leverage"], "strong");
        assert_eq!(value["email_template"], "Hi");
    }
}

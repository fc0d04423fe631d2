// Compensation strategy prompt templates.

pub const NEGOTIATOR_PERSONA: &str =
    "You are a compensation negotiation coach who has closed thousands of tech offers.";

/// Replace: {role}, {location}, {years_experience}, {currency}, {offer}, {competing},
/// {target}, {anchor}, {walk_away}, {leverage}
pub const STRATEGY_PROMPT: &str = r#"Prepare a negotiation plan for a candidate holding an offer.

ROLE: {role}
LOCATION: {location}
YEARS OF EXPERIENCE: {years_experience}
CURRENCY: {currency}

CURRENT OFFER: {offer}
COMPETING OFFERS (base salary): {competing}

The numbers below are fixed. Use them exactly as written and never propose other figures:
- Target base salary: {target}
- First ask (anchor): {anchor}
- Walk-away base salary: {walk_away}
- Leverage: {leverage}

Return a JSON object:
{
  "talking_points": ["Short sentences the candidate can say on the call"],
  "risks": ["What could go wrong and how to handle it"],
  "email_template": "A complete counter-offer email that asks for the anchor figure"
}

Rules:
- 3-6 talking points grounded in the candidate's experience and leverage
- Do not invent competing offers, market data or company facts
- Keep the email under 200 words, polite and specific"#;

//! Phrase scan run over every contract before it reaches the LLM.
//!
//! Matching is ASCII case-insensitive so byte offsets in the lowered copy line
//! up with the original text.

use serde::{Deserialize, Serialize};

use crate::contracts::scoring::RiskLevel;

pub const EXCERPT_LEN: usize = 120;
const MAX_PROBATION_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub category: String,
    pub excerpt: String,
    pub risk: RiskLevel,
}

struct PhraseRule {
    category: &'static str,
    risk: RiskLevel,
    phrases: &'static [&'static str],
}

const RULES: &[PhraseRule] = &[
    PhraseRule {
        category: "non_compete",
        risk: RiskLevel::High,
        phrases: &[
            "non-compete",
            "non compete",
            "noncompete",
            "covenant not to compete",
            "shall not compete",
            "not engage in any competing",
        ],
    },
    PhraseRule {
        category: "ip_assignment",
        risk: RiskLevel::High,
        phrases: &[
            "prior inventions",
            "inventions made before",
            "whether or not during working hours",
            "outside of working hours",
            "outside working hours",
        ],
    },
    PhraseRule {
        category: "arbitration",
        risk: RiskLevel::Medium,
        phrases: &[
            "binding arbitration",
            "mandatory arbitration",
            "waive the right to a jury",
            "waives the right to a jury",
            "class action waiver",
        ],
    },
    PhraseRule {
        category: "unilateral_amendment",
        risk: RiskLevel::Medium,
        phrases: &[
            "amend this agreement at any time",
            "modify this agreement at any time",
            "sole discretion to amend",
            "sole discretion to modify",
            "reserves the right to change",
            "unilaterally",
        ],
    },
    PhraseRule {
        category: "termination",
        risk: RiskLevel::High,
        phrases: &[
            "without notice",
            "without prior notice",
            "terminate immediately",
            "terminated immediately",
        ],
    },
    PhraseRule {
        category: "overtime",
        risk: RiskLevel::Medium,
        phrases: &[
            "unpaid overtime",
            "without additional compensation",
            "overtime is included",
            "overtime shall not be compensated",
            "no overtime pay",
        ],
    },
];

/// At most one flag per category: the first match in document order.
pub fn scan_red_flags(text: &str) -> Vec<RedFlag> {
    let lowered = text.to_ascii_lowercase();
    let mut flags = Vec::new();

    for rule in RULES {
        let first = rule
            .phrases
            .iter()
            .filter_map(|p| lowered.find(p).map(|pos| (pos, p.len())))
            .min_by_key(|(pos, _)| *pos);
        if let Some((pos, len)) = first {
            flags.push(RedFlag {
                category: rule.category.to_string(),
                excerpt: excerpt_around(text, pos, len),
                risk: rule.risk,
            });
        }
    }

    if let Some((pos, len)) = find_long_probation(&lowered) {
        flags.push(RedFlag {
            category: "probation".to_string(),
            excerpt: excerpt_around(text, pos, len),
            risk: RiskLevel::Medium,
        });
    }

    flags
}

/// Finds "probation ... N months" with N above the limit, looking a short
/// distance past each "probation" mention.
fn find_long_probation(lowered: &str) -> Option<(usize, usize)> {
    const LOOKAHEAD: usize = 80;

    for (pos, _) in lowered.match_indices("probation") {
        let window_end = floor_char_boundary(lowered, (pos + LOOKAHEAD).min(lowered.len()));
        let window = &lowered[pos..window_end];

        let mut digits = String::new();
        for (i, ch) in window.char_indices() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            if !digits.is_empty() {
                let rest = window[i..].trim_start();
                let months: u32 = digits.parse().unwrap_or(0);
                if rest.starts_with("month") && months > MAX_PROBATION_MONTHS {
                    return Some((pos, i));
                }
                digits.clear();
            }
        }
    }
    None
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Up to `EXCERPT_LEN` characters centred on the match, whitespace collapsed.
pub fn excerpt_around(text: &str, byte_pos: usize, match_len: usize) -> String {
    let match_start = text[..byte_pos].chars().count();
    let match_chars = text[byte_pos..byte_pos + match_len].chars().count();
    let pad = EXCERPT_LEN.saturating_sub(match_chars) / 2;
    let start = match_start.saturating_sub(pad);

    let raw: String = text.chars().skip(start).take(EXCERPT_LEN).collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

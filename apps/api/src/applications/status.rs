use serde::{Deserialize, Serialize};

/// Pipeline status of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Screening,
    Interviewing,
    Offer,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::Saved,
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offer,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "saved",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// Terminal statuses are final; everything else may move anywhere.
    pub fn can_transition(&self, to: ApplicationStatus) -> bool {
        *self == to || !self.is_terminal()
    }

    /// The employer has reacted to the application in some way.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Screening
                | ApplicationStatus::Interviewing
                | ApplicationStatus::Offer
                | ApplicationStatus::Accepted
                | ApplicationStatus::Rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses_cannot_move() {
        for from in [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert!(!from.can_transition(ApplicationStatus::Applied));
            assert!(!from.can_transition(ApplicationStatus::Saved));
            assert!(from.can_transition(from));
        }
    }

    #[test]
    fn test_open_statuses_move_freely() {
        assert!(ApplicationStatus::Saved.can_transition(ApplicationStatus::Offer));
        assert!(ApplicationStatus::Interviewing.can_transition(ApplicationStatus::Applied));
        assert!(ApplicationStatus::Offer.can_transition(ApplicationStatus::Withdrawn));
    }

    #[test]
    fn test_parse_matches_serde_names() {
        for status in ApplicationStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("ghosted"), None);
    }

    #[test]
    fn test_withdrawn_is_not_a_response() {
        assert!(!ApplicationStatus::Withdrawn.is_response());
        assert!(!ApplicationStatus::Applied.is_response());
        assert!(ApplicationStatus::Rejected.is_response());
    }
}

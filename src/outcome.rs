use serde::Serialize;
use std::fmt;

/// Result of an operation that ran to completion without failing.
///
/// Failures are carried by [`crate::VolkitError`]; a `Skipped` outcome is a
/// soft success where nothing on disk was touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome<T> {
    Completed(T),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing in the directory matched.
    NoMatchingFiles,
    /// The requested row count is not below the number of eligible rows.
    NotEnoughRows { requested: usize, eligible: usize },
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(report) => Some(report),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Skipped(reason) => Some(reason),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoMatchingFiles => write!(f, "no matching files found"),
            SkipReason::NotEnoughRows {
                requested,
                eligible,
            } => write!(
                f,
                "number of rows to keep ({}) is greater than or equal to the eligible row count ({})",
                requested, eligible
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let done: Outcome<u32> = Outcome::Completed(7);
        assert!(done.is_completed());
        assert_eq!(done.skip_reason(), None);
        assert_eq!(done.completed(), Some(7));

        let skipped: Outcome<u32> = Outcome::Skipped(SkipReason::NoMatchingFiles);
        assert!(skipped.is_skipped());
        assert_eq!(skipped.completed(), None);
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::NotEnoughRows {
            requested: 10,
            eligible: 4,
        };
        let text = reason.to_string();
        assert!(text.contains("10"));
        assert!(text.contains("4"));
    }

    #[test]
    fn test_outcome_json_shape() {
        let skipped: Outcome<u32> = Outcome::Skipped(SkipReason::NotEnoughRows {
            requested: 3,
            eligible: 2,
        });
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["detail"]["reason"], "not_enough_rows");
        assert_eq!(json["detail"]["eligible"], 2);
    }
}

// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket status vocabulary.
//!
//! A status is stored and transported as a single string (`"awaiting"`,
//! `"corrected-2"`, ...) but handled in code as a closed enum so that match
//! arms cover every state and the attempt counter rides inside the variants
//! that carry one. Strings that do not parse are rejected at the boundary
//! rather than mapped to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Workflow state of a stoppage ticket.
///
/// `AwaitingVerification` and `Corrected` carry the verification attempt the
/// ticket is on. The first request for verification is attempt 1; each failed
/// verification advances the counter by one for the rest of the ticket's
/// life, including the eventual `Corrected` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    /// Reported, waiting for a maintainer to start work.
    Awaiting,
    /// A maintainer is actively working the stoppage.
    InProgress,
    /// The maintainer finished; a supervisor must verify the fix.
    AwaitingVerification { attempt: u32 },
    /// A supervisor rejected the fix; the ticket needs rework.
    NotCorrected,
    /// Terminal: the fix was verified on the given attempt.
    Corrected { attempt: u32 },
    /// Terminal: withdrawn before completion.
    Canceled,
    /// Terminal: closed by the expiration monitor because work never started
    /// within the scheduled window.
    Expired,
}

impl TicketStatus {
    /// True for statuses that admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Corrected { .. } | Self::Canceled | Self::Expired
        )
    }

    /// True while the ticket still needs somebody to act on it.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// The attempt-erased discriminant, for filtering and storage indexes.
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Awaiting => StatusKind::Awaiting,
            Self::InProgress => StatusKind::InProgress,
            Self::AwaitingVerification { .. } => StatusKind::AwaitingVerification,
            Self::NotCorrected => StatusKind::NotCorrected,
            Self::Corrected { .. } => StatusKind::Corrected,
            Self::Canceled => StatusKind::Canceled,
            Self::Expired => StatusKind::Expired,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awaiting => f.write_str("awaiting"),
            Self::InProgress => f.write_str("in-progress"),
            Self::AwaitingVerification { attempt } => {
                write!(f, "awaiting-verification-{attempt}")
            }
            Self::NotCorrected => f.write_str("not-corrected"),
            Self::Corrected { attempt } => write!(f, "corrected-{attempt}"),
            Self::Canceled => f.write_str("canceled"),
            Self::Expired => f.write_str("auto-expired"),
        }
    }
}

/// A status string that is not part of the vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized ticket status: `{0}`")]
pub struct ParseStatusError(pub String);

impl FromStr for TicketStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting" => Ok(Self::Awaiting),
            "in-progress" => Ok(Self::InProgress),
            "not-corrected" => Ok(Self::NotCorrected),
            "canceled" => Ok(Self::Canceled),
            "auto-expired" => Ok(Self::Expired),
            other => {
                let parse_attempt = |suffix: &str| {
                    suffix
                        .parse::<u32>()
                        .map_err(|_| ParseStatusError(s.to_owned()))
                };
                if let Some(suffix) = other.strip_prefix("awaiting-verification-") {
                    Ok(Self::AwaitingVerification {
                        attempt: parse_attempt(suffix)?,
                    })
                } else if let Some(suffix) = other.strip_prefix("corrected-") {
                    Ok(Self::Corrected {
                        attempt: parse_attempt(suffix)?,
                    })
                } else {
                    Err(ParseStatusError(s.to_owned()))
                }
            }
        }
    }
}

impl Serialize for TicketStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Status discriminant without the attempt counter.
///
/// Used where callers select tickets by state ("everything awaiting
/// verification") and the attempt number is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum StatusKind {
    Awaiting,
    InProgress,
    AwaitingVerification,
    NotCorrected,
    Corrected,
    Canceled,
    #[strum(serialize = "auto-expired")]
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_statuses_round_trip_through_strings() {
        for status in [
            TicketStatus::Awaiting,
            TicketStatus::InProgress,
            TicketStatus::NotCorrected,
            TicketStatus::Canceled,
            TicketStatus::Expired,
        ] {
            let text = status.to_string();
            assert_eq!(text.parse::<TicketStatus>(), Ok(status), "via `{text}`");
        }
    }

    #[test]
    fn attempt_statuses_carry_the_counter_in_the_string() {
        assert_eq!(
            TicketStatus::AwaitingVerification { attempt: 1 }.to_string(),
            "awaiting-verification-1"
        );
        assert_eq!(
            TicketStatus::Corrected { attempt: 3 }.to_string(),
            "corrected-3"
        );
        assert_eq!(
            "awaiting-verification-12".parse::<TicketStatus>(),
            Ok(TicketStatus::AwaitingVerification { attempt: 12 })
        );
        assert_eq!(
            "corrected-2".parse::<TicketStatus>(),
            Ok(TicketStatus::Corrected { attempt: 2 })
        );
    }

    #[test]
    fn expired_uses_the_auto_expired_wire_string() {
        assert_eq!(TicketStatus::Expired.to_string(), "auto-expired");
        assert_eq!("auto-expired".parse(), Ok(TicketStatus::Expired));
        assert!("expired".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn unknown_and_malformed_strings_are_rejected() {
        for raw in [
            "",
            "done",
            "corrected",
            "corrected-",
            "corrected-x",
            "awaiting-verification",
            "awaiting-verification--1",
            "Corrected-1",
        ] {
            assert!(raw.parse::<TicketStatus>().is_err(), "accepted `{raw}`");
        }
    }

    #[test]
    fn terminal_statuses_are_exactly_the_closed_ones() {
        assert!(TicketStatus::Corrected { attempt: 1 }.is_terminal());
        assert!(TicketStatus::Canceled.is_terminal());
        assert!(TicketStatus::Expired.is_terminal());
        assert!(TicketStatus::Awaiting.is_open());
        assert!(TicketStatus::InProgress.is_open());
        assert!(TicketStatus::AwaitingVerification { attempt: 4 }.is_open());
        assert!(TicketStatus::NotCorrected.is_open());
    }

    #[test]
    fn serde_uses_the_display_string() {
        let json = serde_json::to_string(&TicketStatus::AwaitingVerification { attempt: 2 })
            .expect("serialize");
        assert_eq!(json, "\"awaiting-verification-2\"");
        let back: TicketStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, TicketStatus::AwaitingVerification { attempt: 2 });
        assert!(serde_json::from_str::<TicketStatus>("\"finished\"").is_err());
    }

    #[test]
    fn kind_erases_the_attempt() {
        assert_eq!(
            TicketStatus::AwaitingVerification { attempt: 7 }.kind(),
            StatusKind::AwaitingVerification
        );
        assert_eq!(
            TicketStatus::Corrected { attempt: 1 }.kind(),
            StatusKind::Corrected
        );
        assert_eq!(StatusKind::Expired.to_string(), "auto-expired");
    }
}

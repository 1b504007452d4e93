// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Eligibility rules.
//!
//! Pure predicates over ticket state, actor identity, and the clock. The
//! transition functions consult these before writing anything; nothing here
//! touches the store.
//!
//! Scheduled times are plant-local wall clock. The rules compare them against
//! the calendar date and time-of-day of the instant they are handed, so the
//! caller decides what "now" means exactly once.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use downtime_core::actor::{Actor, Role};
use downtime_core::status::TicketStatus;
use downtime_core::ticket::StoppageTicket;

/// How many minutes before the scheduled start execution may begin.
pub const EARLY_START_GRACE_MINUTES: i64 = 5;

/// Outcome of the early-start rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartEligibility {
    /// Starting is permitted. `late` is set when the scheduled start has
    /// already passed.
    Allowed { late: bool },
    /// The grace window has not opened yet. Advisory, not a failure: the
    /// caller retries closer to the scheduled time.
    TooEarly { opens_at: NaiveDateTime },
}

/// Applies the no-early-start rule.
///
/// Execution may begin at most [`EARLY_START_GRACE_MINUTES`] minutes before
/// `scheduled_start` on `scheduled_date`, or on the current day when no date
/// is pinned. Starting later than scheduled is always allowed.
pub fn check_start(
    scheduled_start: NaiveTime,
    scheduled_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> StartEligibility {
    let now = now.naive_utc();
    let date = scheduled_date.unwrap_or_else(|| now.date());
    let start = date.and_time(scheduled_start);
    let opens_at = start - Duration::minutes(EARLY_START_GRACE_MINUTES);
    if now < opens_at {
        StartEligibility::TooEarly { opens_at }
    } else {
        StartEligibility::Allowed { late: now > start }
    }
}

/// Wait message shown when a start request lands before the grace window.
pub fn wait_message(opens_at: NaiveDateTime) -> String {
    format!(
        "too early to start execution; window opens at {}",
        opens_at.format("%Y-%m-%d %H:%M")
    )
}

/// True once the scheduled window has fully elapsed.
///
/// With a scheduled date the comparison is date-then-time. Without one the
/// window recurs daily, so only the current day's time-of-day counts.
pub fn is_expired(
    scheduled_end: NaiveTime,
    scheduled_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> bool {
    let now = now.naive_utc();
    match scheduled_date {
        Some(date) => now > date.and_time(scheduled_end),
        None => now.time() > scheduled_end,
    }
}

/// Denial reason when `actor` may not start execution.
pub fn start_denial(actor: &Actor) -> Option<&'static str> {
    (actor.role != Role::Maintainer).then_some("only a maintainer may start execution")
}

/// Denial reason when `actor` may not finish the ticket's execution.
pub fn finish_denial(ticket: &StoppageTicket, actor: &Actor) -> Option<&'static str> {
    (!ticket.is_assigned_to(&actor.id))
        .then_some("only the assigned maintainer may finish execution")
}

/// Denial reason when `actor` may not verify a completed repair.
pub fn verify_denial(actor: &Actor) -> Option<&'static str> {
    (actor.role != Role::Supervisor).then_some("only a supervisor may verify a repair")
}

/// Denial reason when `actor` may not respond to a rejected repair.
pub fn rework_denial(ticket: &StoppageTicket, actor: &Actor) -> Option<&'static str> {
    (!ticket.is_assigned_to(&actor.id))
        .then_some("only the assigned maintainer may respond to a rejection")
}

/// Denial reason when `actor` may not cancel the ticket.
///
/// Assumes the status was already checked to be one that admits cancellation.
pub fn cancel_denial(ticket: &StoppageTicket, actor: &Actor) -> Option<&'static str> {
    match ticket.status {
        TicketStatus::Awaiting if ticket.reported_by_id != actor.id => {
            Some("only the reporter may cancel an awaiting ticket")
        }
        TicketStatus::InProgress if !ticket.is_assigned_to(&actor.id) => {
            Some("only the assigned maintainer may cancel an in-progress ticket")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("timestamp")
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("time")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn start_is_too_early_outside_the_grace_window() {
        // 08:50 for a 09:00 start: ten minutes out.
        let result = check_start(time(9, 0), None, at("2026-03-05T08:50:00Z"));
        let StartEligibility::TooEarly { opens_at } = result else {
            panic!("expected too-early, got {result:?}");
        };
        assert_eq!(opens_at, date(2026, 3, 5).and_time(time(8, 55)));
    }

    #[test]
    fn start_is_allowed_from_exactly_five_minutes_before() {
        assert_eq!(
            check_start(time(9, 0), None, at("2026-03-05T08:55:00Z")),
            StartEligibility::Allowed { late: false }
        );
        // One second earlier is still too early.
        assert!(matches!(
            check_start(time(9, 0), None, at("2026-03-05T08:54:59Z")),
            StartEligibility::TooEarly { .. }
        ));
    }

    #[test]
    fn start_at_or_after_schedule_is_allowed_and_flags_late() {
        // Exactly on the scheduled start: on time.
        assert_eq!(
            check_start(time(9, 0), None, at("2026-03-05T09:00:00Z")),
            StartEligibility::Allowed { late: false }
        );
        assert_eq!(
            check_start(time(9, 0), None, at("2026-03-05T09:00:01Z")),
            StartEligibility::Allowed { late: true }
        );
        // Hours past the window is still just late, never rejected.
        assert_eq!(
            check_start(time(9, 0), None, at("2026-03-05T17:30:00Z")),
            StartEligibility::Allowed { late: true }
        );
    }

    #[test]
    fn pinned_date_moves_the_window_to_that_day() {
        let scheduled = Some(date(2026, 3, 6));
        // Day before: too early, opening on the pinned day.
        let result = check_start(time(9, 0), scheduled, at("2026-03-05T09:00:00Z"));
        let StartEligibility::TooEarly { opens_at } = result else {
            panic!("expected too-early, got {result:?}");
        };
        assert_eq!(opens_at, date(2026, 3, 6).and_time(time(8, 55)));

        // Day after: allowed and late.
        assert_eq!(
            check_start(time(9, 0), scheduled, at("2026-03-07T07:00:00Z")),
            StartEligibility::Allowed { late: true }
        );
    }

    #[test]
    fn wait_message_names_the_opening_instant() {
        let message = wait_message(date(2026, 3, 5).and_time(time(8, 55)));
        assert!(message.contains("too early"), "got: {message}");
        assert!(message.contains("2026-03-05 08:55"), "got: {message}");
    }

    #[test]
    fn dateless_window_expires_on_time_of_day() {
        assert!(!is_expired(time(9, 30), None, at("2026-03-05T09:30:00Z")));
        assert!(is_expired(time(9, 30), None, at("2026-03-05T09:30:01Z")));
        assert!(is_expired(time(9, 30), None, at("2026-03-05T09:31:00Z")));
        assert!(!is_expired(time(9, 30), None, at("2026-03-05T08:00:00Z")));
    }

    #[test]
    fn dated_window_compares_date_before_time() {
        let scheduled = Some(date(2026, 3, 5));
        // Earlier day, later time-of-day: not expired.
        assert!(!is_expired(time(9, 30), scheduled, at("2026-03-04T23:00:00Z")));
        // Same day, past the end.
        assert!(is_expired(time(9, 30), scheduled, at("2026-03-05T09:31:00Z")));
        // Any later day, even before the time-of-day.
        assert!(is_expired(time(9, 30), scheduled, at("2026-03-06T05:00:00Z")));
    }

    #[test]
    fn role_guards_name_the_denied_party() {
        let supervisor = Actor::supervisor("s-1", "Lee");
        let maintainer = Actor::maintainer("m-1", "Dana");
        assert!(start_denial(&supervisor).is_some());
        assert!(start_denial(&maintainer).is_none());
        assert!(verify_denial(&maintainer).is_some());
        assert!(verify_denial(&supervisor).is_none());
    }
}

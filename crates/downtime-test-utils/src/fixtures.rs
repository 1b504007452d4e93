// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared actors and ticket fixtures.

use chrono::NaiveTime;

use downtime_core::actor::Actor;
use downtime_core::ticket::NewStoppage;

/// Maintainer most tests start execution with.
pub fn maintainer() -> Actor {
    Actor::maintainer("m-1", "Dana Reyes")
}

/// A second maintainer, for assignment guard tests.
pub fn other_maintainer() -> Actor {
    Actor::maintainer("m-2", "Noah Lim")
}

/// Supervisor used for verification.
pub fn supervisor() -> Actor {
    Actor::supervisor("s-1", "Lee Ortega")
}

/// Identity that reports the stoppages in fixtures.
pub fn reporter() -> Actor {
    Actor::supervisor("rep-1", "Paula Mendes")
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time of day")
}

/// A plain stoppage on press-04 with the given daily window and nothing
/// optional filled in.
pub fn stoppage(scheduled_start: NaiveTime, scheduled_end: NaiveTime) -> NewStoppage {
    NewStoppage {
        equipment: "press-04".into(),
        sector: "stamping".into(),
        description: "hydraulic pressure loss".into(),
        notes: None,
        asset_id: None,
        part_id: None,
        subpart_id: None,
        scheduled_start,
        scheduled_end,
        scheduled_date: None,
    }
}

/// Same stoppage but linked to a tracked part, for planner hook tests.
pub fn stoppage_with_part(scheduled_start: NaiveTime, scheduled_end: NaiveTime) -> NewStoppage {
    NewStoppage {
        asset_id: Some("asset-9".into()),
        part_id: Some("hydraulic-pump".into()),
        subpart_id: Some("seal-kit".into()),
        ..stoppage(scheduled_start, scheduled_end)
    }
}

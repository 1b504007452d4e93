// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transition functions for stoppage tickets.
//!
//! [`WorkflowEngine`] validates input, consults the eligibility rules,
//! builds the audit record, and commits each transition through the ticket
//! store conditioned on the status the decision was made against. Business
//! rule rejections come back as typed errors, never panics, and every public
//! operation hands exactly one [`Notice`] to the notifier.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use downtime_core::action::ActionKind;
use downtime_core::actor::{Actor, SYSTEM_ACTOR_ID, SYSTEM_ACTOR_NAME};
use downtime_core::clock::Clock;
use downtime_core::error::{StoreError, WorkflowError};
use downtime_core::notify::{Notice, Notifier};
use downtime_core::planner::MaintenancePlanner;
use downtime_core::status::TicketStatus;
use downtime_core::store::{TicketPatch, TicketStore};
use downtime_core::ticket::{NewStoppage, StoppageTicket, TicketId};

use crate::audit;
use crate::guard::{self, StartEligibility};

/// Note recorded when the expiration sweep closes a ticket.
pub const AUTO_EXPIRE_NOTE: &str = "not started within scheduled window";

/// Outcome of a start request whose hard preconditions all passed.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// Execution began; the snapshot reflects the committed transition.
    Started(StoppageTicket),
    /// The grace window has not opened yet. Nothing was written and no
    /// audit record exists; the caller retries closer to the window.
    TooEarly {
        opens_at: NaiveDateTime,
        message: String,
    },
}

/// Outcome of a transition that closes a ticket as corrected.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub ticket: StoppageTicket,
    /// Next maintenance date for the linked part, when the ticket references
    /// one and the planner call succeeded.
    pub maintenance_due: Option<NaiveDate>,
}

/// The guarded transition functions of the stoppage workflow.
///
/// All ticket state lives in the store; the engine is stateless and shared
/// freely. Concurrent transitions on one ticket serialize through the
/// store's conditional update instead of overwriting each other.
pub struct WorkflowEngine {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    planner: Arc<dyn MaintenancePlanner>,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn TicketStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        planner: Arc<dyn MaintenancePlanner>,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            planner,
        }
    }

    /// Reports a new stoppage. The ticket starts awaiting, attempt 1, with
    /// an empty history.
    pub async fn open(
        &self,
        new: NewStoppage,
        reporter: &Actor,
    ) -> Result<StoppageTicket, WorkflowError> {
        let result = self.open_inner(new, reporter).await;
        let notice = match &result {
            Ok(ticket) => Notice::info(
                Some(ticket.id.clone()),
                format!("stoppage reported for {}", ticket.equipment),
            ),
            Err(err) => Notice::error(None, err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn open_inner(
        &self,
        new: NewStoppage,
        reporter: &Actor,
    ) -> Result<StoppageTicket, WorkflowError> {
        let equipment = required(&new.equipment, "equipment")?;
        let sector = required(&new.sector, "sector")?;
        let description = required(&new.description, "description")?;
        if new.scheduled_end <= new.scheduled_start {
            return Err(WorkflowError::validation(
                "scheduled end must be after scheduled start",
            ));
        }
        let now = self.clock.now();
        let ticket = StoppageTicket {
            id: TicketId::random(),
            equipment,
            sector,
            asset_id: trimmed_opt(new.asset_id),
            part_id: trimmed_opt(new.part_id),
            subpart_id: trimmed_opt(new.subpart_id),
            description,
            notes: trimmed_opt(new.notes),
            scheduled_start: new.scheduled_start,
            scheduled_end: new.scheduled_end,
            scheduled_date: new.scheduled_date,
            execution_started_at: None,
            execution_ended_at: None,
            total_elapsed_secs: None,
            status: TicketStatus::Awaiting,
            attempt: 1,
            is_late: false,
            applied_solution: None,
            verification_note: None,
            reported_by_id: reporter.id.clone(),
            reported_by_name: reporter.name.clone(),
            assigned_maintainer_id: None,
            assigned_maintainer_name: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.create(&ticket).await?;
        tracing::info!(
            ticket = ticket.id.as_str(),
            equipment = %ticket.equipment,
            sector = %ticket.sector,
            "stoppage reported"
        );
        Ok(ticket)
    }

    /// Begins execution of an awaiting ticket and assigns the maintainer.
    ///
    /// Subject to the no-early-start rule: a too-early request is an
    /// advisory outcome, not an error, and writes nothing.
    pub async fn start_execution(
        &self,
        id: &TicketId,
        actor: &Actor,
    ) -> Result<StartOutcome, WorkflowError> {
        let result = self.start_inner(id, actor).await;
        let notice = match &result {
            Ok(StartOutcome::Started(_)) => Notice::info(Some(id.clone()), "execution started"),
            Ok(StartOutcome::TooEarly { message, .. }) => {
                Notice::advisory(Some(id.clone()), message.clone())
            }
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn start_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
    ) -> Result<StartOutcome, WorkflowError> {
        if let Some(reason) = guard::start_denial(actor) {
            return Err(WorkflowError::denied(reason));
        }
        let ticket = self.load(id).await?;
        if ticket.status != TicketStatus::Awaiting {
            return Err(WorkflowError::InvalidState {
                action: "start execution",
                status: ticket.status,
            });
        }
        let now = self.clock.now();
        let late = match guard::check_start(ticket.scheduled_start, ticket.scheduled_date, now) {
            StartEligibility::TooEarly { opens_at } => {
                tracing::debug!(
                    ticket = id.as_str(),
                    opens_at = %opens_at,
                    "start requested before the grace window"
                );
                return Ok(StartOutcome::TooEarly {
                    opens_at,
                    message: guard::wait_message(opens_at),
                });
            }
            StartEligibility::Allowed { late } => late,
        };
        let record = audit::build_record(
            &ticket,
            ActionKind::Started,
            &actor.id,
            &actor.name,
            now,
            None,
            TicketStatus::InProgress,
        );
        let patch = TicketPatch {
            status: Some(TicketStatus::InProgress),
            is_late: Some(late),
            execution_started_at: Some(now),
            assigned_maintainer_id: Some(actor.id.clone()),
            assigned_maintainer_name: Some(actor.name.clone()),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self
            .commit(id, &TicketStatus::Awaiting, patch, "start execution")
            .await?;
        tracing::info!(
            ticket = id.as_str(),
            maintainer = %actor.id,
            late,
            "execution started"
        );
        Ok(StartOutcome::Started(updated))
    }

    /// Declares the repair work done and requests verification.
    ///
    /// Elapsed time is measured from the original execution start, so a
    /// finish after rework still accounts the full span.
    pub async fn finish_execution(
        &self,
        id: &TicketId,
        actor: &Actor,
        applied_solution: &str,
    ) -> Result<StoppageTicket, WorkflowError> {
        let result = self.finish_inner(id, actor, applied_solution).await;
        let notice = match &result {
            Ok(ticket) => Notice::info(
                Some(ticket.id.clone()),
                "execution finished; awaiting verification",
            ),
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn finish_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
        applied_solution: &str,
    ) -> Result<StoppageTicket, WorkflowError> {
        let solution = required(applied_solution, "applied solution")?;
        let ticket = self.load(id).await?;
        if ticket.status != TicketStatus::InProgress {
            return Err(WorkflowError::InvalidState {
                action: "finish execution",
                status: ticket.status,
            });
        }
        if let Some(reason) = guard::finish_denial(&ticket, actor) {
            return Err(WorkflowError::denied(reason));
        }
        let started = ticket.execution_started_at.ok_or_else(|| {
            WorkflowError::Corrupt("in-progress ticket has no execution start".into())
        })?;
        let now = self.clock.now();
        let elapsed = (now - started).num_seconds().max(0);
        let next = TicketStatus::AwaitingVerification {
            attempt: ticket.attempt,
        };
        let record = audit::build_record(
            &ticket,
            ActionKind::Finished,
            &actor.id,
            &actor.name,
            now,
            Some(solution.clone()),
            next,
        );
        let patch = TicketPatch {
            status: Some(next),
            execution_ended_at: Some(now),
            total_elapsed_secs: Some(elapsed),
            applied_solution: Some(solution),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self
            .commit(id, &TicketStatus::InProgress, patch, "finish execution")
            .await?;
        tracing::info!(
            ticket = id.as_str(),
            elapsed_secs = elapsed,
            attempt = updated.attempt,
            "execution finished"
        );
        Ok(updated)
    }

    /// Supervisor accepts the repair; terminal on the current attempt.
    pub async fn verify_pass(
        &self,
        id: &TicketId,
        actor: &Actor,
        note: Option<&str>,
    ) -> Result<VerifyOutcome, WorkflowError> {
        let result = self.verify_pass_inner(id, actor, note).await;
        let notice = match &result {
            Ok(outcome) => Notice::info(
                Some(outcome.ticket.id.clone()),
                format!("repair verified on attempt {}", outcome.ticket.attempt),
            ),
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn verify_pass_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
        note: Option<&str>,
    ) -> Result<VerifyOutcome, WorkflowError> {
        if let Some(reason) = guard::verify_denial(actor) {
            return Err(WorkflowError::denied(reason));
        }
        let ticket = self.load(id).await?;
        let TicketStatus::AwaitingVerification { attempt } = ticket.status else {
            return Err(WorkflowError::InvalidState {
                action: "verify repair",
                status: ticket.status,
            });
        };
        let now = self.clock.now();
        let next = TicketStatus::Corrected { attempt };
        let note = trimmed_opt(note.map(str::to_owned));
        let record = audit::build_record(
            &ticket,
            ActionKind::VerifiedOk,
            &actor.id,
            &actor.name,
            now,
            note.clone(),
            next,
        );
        let patch = TicketPatch {
            status: Some(next),
            verification_note: note,
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self
            .commit(id, &ticket.status, patch, "verify repair")
            .await?;
        tracing::info!(ticket = id.as_str(), attempt, "repair verified");
        let maintenance_due = self.follow_up_maintenance(&updated).await;
        Ok(VerifyOutcome {
            ticket: updated,
            maintenance_due,
        })
    }

    /// Supervisor rejects the repair; the ticket needs rework and the
    /// attempt counter advances.
    pub async fn verify_fail(
        &self,
        id: &TicketId,
        actor: &Actor,
        note: &str,
    ) -> Result<StoppageTicket, WorkflowError> {
        let result = self.verify_fail_inner(id, actor, note).await;
        let notice = match &result {
            Ok(ticket) => Notice::info(
                Some(ticket.id.clone()),
                "repair rejected; ticket returned for rework",
            ),
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn verify_fail_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
        note: &str,
    ) -> Result<StoppageTicket, WorkflowError> {
        if let Some(reason) = guard::verify_denial(actor) {
            return Err(WorkflowError::denied(reason));
        }
        let note = required(note, "rejection reason")?;
        let ticket = self.load(id).await?;
        let TicketStatus::AwaitingVerification { attempt } = ticket.status else {
            return Err(WorkflowError::InvalidState {
                action: "reject repair",
                status: ticket.status,
            });
        };
        let now = self.clock.now();
        let record = audit::build_record(
            &ticket,
            ActionKind::VerifiedNotOk,
            &actor.id,
            &actor.name,
            now,
            Some(note.clone()),
            TicketStatus::NotCorrected,
        );
        let patch = TicketPatch {
            status: Some(TicketStatus::NotCorrected),
            attempt: Some(attempt + 1),
            verification_note: Some(note),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self
            .commit(id, &ticket.status, patch, "reject repair")
            .await?;
        tracing::info!(
            ticket = id.as_str(),
            attempt = updated.attempt,
            "repair rejected"
        );
        Ok(updated)
    }

    /// Maintainer self-certifies a rejected repair as fixed, bypassing a
    /// second supervisor review. Terminal.
    pub async fn mark_corrected(
        &self,
        id: &TicketId,
        actor: &Actor,
    ) -> Result<VerifyOutcome, WorkflowError> {
        let result = self.mark_corrected_inner(id, actor).await;
        let notice = match &result {
            Ok(outcome) => Notice::info(
                Some(outcome.ticket.id.clone()),
                format!(
                    "rework closed as corrected on attempt {}",
                    outcome.ticket.attempt
                ),
            ),
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn mark_corrected_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
    ) -> Result<VerifyOutcome, WorkflowError> {
        let ticket = self.load(id).await?;
        if ticket.status != TicketStatus::NotCorrected {
            return Err(WorkflowError::InvalidState {
                action: "mark corrected",
                status: ticket.status,
            });
        }
        if let Some(reason) = guard::rework_denial(&ticket, actor) {
            return Err(WorkflowError::denied(reason));
        }
        let now = self.clock.now();
        let next = TicketStatus::Corrected {
            attempt: ticket.attempt,
        };
        let record = audit::build_record(
            &ticket,
            ActionKind::Corrected,
            &actor.id,
            &actor.name,
            now,
            None,
            next,
        );
        let patch = TicketPatch {
            status: Some(next),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self
            .commit(id, &TicketStatus::NotCorrected, patch, "mark corrected")
            .await?;
        tracing::info!(
            ticket = id.as_str(),
            attempt = updated.attempt,
            "rework closed as corrected"
        );
        let maintenance_due = self.follow_up_maintenance(&updated).await;
        Ok(VerifyOutcome {
            ticket: updated,
            maintenance_due,
        })
    }

    /// Maintainer reports the failure persists; execution resumes on the
    /// already-advanced attempt. The original start timestamp is untouched
    /// so elapsed time keeps accumulating from the first start.
    pub async fn mark_not_corrected(
        &self,
        id: &TicketId,
        actor: &Actor,
    ) -> Result<StoppageTicket, WorkflowError> {
        let result = self.mark_not_corrected_inner(id, actor).await;
        let notice = match &result {
            Ok(ticket) => Notice::info(
                Some(ticket.id.clone()),
                format!("execution resumed for attempt {}", ticket.attempt),
            ),
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn mark_not_corrected_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
    ) -> Result<StoppageTicket, WorkflowError> {
        let ticket = self.load(id).await?;
        if ticket.status != TicketStatus::NotCorrected {
            return Err(WorkflowError::InvalidState {
                action: "resume execution",
                status: ticket.status,
            });
        }
        if let Some(reason) = guard::rework_denial(&ticket, actor) {
            return Err(WorkflowError::denied(reason));
        }
        let now = self.clock.now();
        let record = audit::build_record(
            &ticket,
            ActionKind::NotCorrected,
            &actor.id,
            &actor.name,
            now,
            None,
            TicketStatus::InProgress,
        );
        let patch = TicketPatch {
            status: Some(TicketStatus::InProgress),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self
            .commit(id, &TicketStatus::NotCorrected, patch, "resume execution")
            .await?;
        tracing::info!(
            ticket = id.as_str(),
            attempt = updated.attempt,
            "execution resumed after rejection"
        );
        Ok(updated)
    }

    /// Withdraws a ticket. Allowed to the reporter while awaiting and to the
    /// assigned maintainer while in progress.
    pub async fn cancel(
        &self,
        id: &TicketId,
        actor: &Actor,
        reason: &str,
    ) -> Result<StoppageTicket, WorkflowError> {
        let result = self.cancel_inner(id, actor, reason).await;
        let notice = match &result {
            Ok(ticket) => Notice::info(Some(ticket.id.clone()), "stoppage canceled"),
            Err(err) => Notice::error(Some(id.clone()), err.to_string()),
        };
        self.notifier.notify(notice).await;
        result
    }

    async fn cancel_inner(
        &self,
        id: &TicketId,
        actor: &Actor,
        reason: &str,
    ) -> Result<StoppageTicket, WorkflowError> {
        let reason = required(reason, "cancellation reason")?;
        let ticket = self.load(id).await?;
        if !matches!(
            ticket.status,
            TicketStatus::Awaiting | TicketStatus::InProgress
        ) {
            return Err(WorkflowError::InvalidState {
                action: "cancel",
                status: ticket.status,
            });
        }
        if let Some(denial) = guard::cancel_denial(&ticket, actor) {
            return Err(WorkflowError::denied(denial));
        }
        let now = self.clock.now();
        let record = audit::build_record(
            &ticket,
            ActionKind::Canceled,
            &actor.id,
            &actor.name,
            now,
            Some(reason),
            TicketStatus::Canceled,
        );
        let patch = TicketPatch {
            status: Some(TicketStatus::Canceled),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self.commit(id, &ticket.status, patch, "cancel").await?;
        tracing::info!(ticket = id.as_str(), by = %actor.id, "stoppage canceled");
        Ok(updated)
    }

    /// Force-closes an awaiting ticket whose scheduled window elapsed.
    ///
    /// Returns `Ok(None)` when there is nothing to do: the ticket is gone,
    /// no longer awaiting, not yet past its window, or a concurrent human
    /// transition won the write. Safe to call repeatedly.
    pub async fn auto_expire(
        &self,
        id: &TicketId,
    ) -> Result<Option<StoppageTicket>, WorkflowError> {
        let result = self.auto_expire_inner(id).await;
        if let Ok(Some(ticket)) = &result {
            self.notifier
                .notify(Notice::info(
                    Some(ticket.id.clone()),
                    format!("stoppage expired: {AUTO_EXPIRE_NOTE}"),
                ))
                .await;
        }
        result
    }

    async fn auto_expire_inner(
        &self,
        id: &TicketId,
    ) -> Result<Option<StoppageTicket>, WorkflowError> {
        let ticket = match self.load(id).await {
            Ok(ticket) => ticket,
            Err(WorkflowError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        if ticket.status != TicketStatus::Awaiting {
            return Ok(None);
        }
        let now = self.clock.now();
        if !guard::is_expired(ticket.scheduled_end, ticket.scheduled_date, now) {
            return Ok(None);
        }
        let record = audit::build_record(
            &ticket,
            ActionKind::AutoExpired,
            SYSTEM_ACTOR_ID,
            SYSTEM_ACTOR_NAME,
            now,
            Some(AUTO_EXPIRE_NOTE.to_owned()),
            TicketStatus::Expired,
        );
        let patch = TicketPatch {
            status: Some(TicketStatus::Expired),
            record: Some(record),
            updated_at: Some(now),
            ..Default::default()
        };
        match self.store.update(id, &TicketStatus::Awaiting, patch).await {
            Ok(updated) => {
                tracing::info!(ticket = id.as_str(), "ticket auto-expired");
                Ok(Some(updated))
            }
            // A human transition got there first; their write stands.
            Err(StoreError::Conflict { .. }) | Err(StoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Best-effort post-commit hook shared by the corrected terminals.
    async fn follow_up_maintenance(&self, ticket: &StoppageTicket) -> Option<NaiveDate> {
        let part = ticket.part_ref()?;
        let performed_on = self.clock.now().date_naive();
        match self.planner.record_maintenance(&part, performed_on).await {
            Ok(due) => {
                tracing::info!(
                    ticket = ticket.id.as_str(),
                    part = %part.part_id,
                    next_due = %due,
                    "follow-up maintenance recorded"
                );
                Some(due)
            }
            Err(err) => {
                // The ticket stays corrected; the planner has its own error
                // channel.
                tracing::warn!(
                    ticket = ticket.id.as_str(),
                    part = %part.part_id,
                    error = %err,
                    "maintenance follow-up failed"
                );
                None
            }
        }
    }

    async fn load(&self, id: &TicketId) -> Result<StoppageTicket, WorkflowError> {
        let ticket = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound { id: id.clone() })?;
        audit::verify_chain(&ticket).map_err(|err| WorkflowError::Corrupt(err.to_string()))?;
        Ok(ticket)
    }

    async fn commit(
        &self,
        id: &TicketId,
        expected: &TicketStatus,
        patch: TicketPatch,
        action: &'static str,
    ) -> Result<StoppageTicket, WorkflowError> {
        match self.store.update(id, expected, patch).await {
            Ok(ticket) => Ok(ticket),
            // Lost the race; report the state the ticket is actually in.
            Err(StoreError::Conflict { found, .. }) => Err(WorkflowError::InvalidState {
                action,
                status: found,
            }),
            Err(StoreError::NotFound { id }) => Err(WorkflowError::NotFound { id }),
            Err(err) => Err(err.into()),
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(WorkflowError::Validation(format!(
            "{field} must not be empty"
        )))
    } else {
        Ok(trimmed.to_owned())
    }
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_whitespace_only_input() {
        assert!(required("  ", "reason").is_err());
        assert!(required("", "reason").is_err());
        assert_eq!(required(" belt ", "reason").expect("trimmed"), "belt");
    }

    #[test]
    fn optional_text_is_trimmed_or_dropped() {
        assert_eq!(trimmed_opt(None), None);
        assert_eq!(trimmed_opt(Some("   ".into())), None);
        assert_eq!(trimmed_opt(Some(" pump ".into())), Some("pump".into()));
    }
}

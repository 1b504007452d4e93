// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Acting identities and their roles.

/// Identifier used when the workflow itself performs a transition, such as
/// the expiration monitor closing an abandoned ticket.
pub const SYSTEM_ACTOR_ID: &str = "system";

/// Display name recorded for automated transitions.
pub const SYSTEM_ACTOR_NAME: &str = "expiration-monitor";

/// What a person is allowed to do in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    /// Executes the repair work.
    Maintainer,
    /// Verifies repairs and rules on disputed outcomes.
    Supervisor,
}

/// The person performing a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn maintainer(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Role::Maintainer)
    }

    pub fn supervisor(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Role::Supervisor)
    }

    /// True for the reserved identity automated transitions run under.
    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_ACTOR_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_kebab_case() {
        assert_eq!("maintainer".parse::<Role>(), Ok(Role::Maintainer));
        assert_eq!("supervisor".parse::<Role>(), Ok(Role::Supervisor));
        assert!("operator".parse::<Role>().is_err());
    }

    #[test]
    fn system_identity_is_detected_by_id() {
        let auto = Actor::new(SYSTEM_ACTOR_ID, SYSTEM_ACTOR_NAME, Role::Supervisor);
        assert!(auto.is_system());
        assert!(!Actor::maintainer("m-1", "Dana").is_system());
    }
}

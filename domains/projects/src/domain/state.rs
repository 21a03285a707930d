//! State machine for the project lifecycle
//!
//! The state machine defines:
//! - Valid states
//! - Events that trigger transitions
//! - Terminal states
//! - Reconciliation against service-reported state, which may only move forward

use promoreel_common::StateError;

// ============================================================================
// Project State Machine
// ============================================================================

/// Project lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectState {
    Draft,
    Processing,
    Completed,
    Failed,
}

impl ProjectState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [ProjectState] {
        match self {
            Self::Draft => &[Self::Processing],
            Self::Processing => &[Self::Completed, Self::Failed],
            Self::Completed => &[],
            Self::Failed => &[],
        }
    }

    /// Ordering of states along the lifecycle. Terminal states share a rank:
    /// a project that has completed or failed never moves again.
    fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Processing => 1,
            Self::Completed | Self::Failed => 2,
        }
    }
}

impl std::fmt::Display for ProjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Events that trigger project state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    /// Generation was triggered against the rendering service
    Generate,
    /// The rendering service reported success
    GenerationSucceeded,
    /// The rendering service reported failure
    GenerationFailed,
}

impl std::fmt::Display for ProjectEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::GenerationSucceeded => write!(f, "generation_succeeded"),
            Self::GenerationFailed => write!(f, "generation_failed"),
        }
    }
}

/// Project state machine
pub struct ProjectStateMachine;

impl ProjectStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(current: ProjectState, event: ProjectEvent) -> Result<ProjectState, StateError> {
        // Check for terminal state
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            // From Draft
            (ProjectState::Draft, ProjectEvent::Generate) => ProjectState::Processing,

            // From Processing
            (ProjectState::Processing, ProjectEvent::GenerationSucceeded) => {
                ProjectState::Completed
            }
            (ProjectState::Processing, ProjectEvent::GenerationFailed) => ProjectState::Failed,

            // Invalid transitions
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: "unknown".to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: ProjectState, event: &ProjectEvent) -> bool {
        Self::transition(current, event.clone()).is_ok()
    }

    /// Reconcile local state with the state reported by the project service.
    ///
    /// The service is authoritative, but reconciliation never moves a project
    /// backward through its lifecycle: a stale or reordered read must not undo
    /// an observed transition. An unrecognized service status arrives here as
    /// `None` and is ignored.
    pub fn reconcile(current: ProjectState, observed: Option<ProjectState>) -> ProjectState {
        let Some(observed) = observed else {
            return current;
        };
        if current.is_terminal() {
            return current;
        }
        if observed.rank() >= current.rank() {
            observed
        } else {
            current
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

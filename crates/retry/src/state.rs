// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The lifecycle of a single retry run.

use std::fmt::Display;

use steadfast_core::{FiniteStateMachine, InvalidStateTrigger, fsm::TransitionTable};

/// The state of a retry run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    /// The run has been created but no attempt has started.
    Idle,
    /// An attempt is in flight or its outcome is being evaluated.
    Running,
    /// The run is paused between attempts.
    Waiting,
    /// An attempt produced an accepted value.
    Succeeded,
    /// Retrying stopped without an accepted value and no recovery was supplied.
    Exhausted,
    /// Retrying stopped and the recovery callback produced the final value.
    Recovered,
    /// The run was cancelled, or the recovery callback failed.
    Aborted,
}

impl RunState {
    /// Returns `true` if no transition leaves this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Exhausted | Self::Recovered | Self::Aborted
        )
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Waiting => "WAITING",
            Self::Succeeded => "SUCCEEDED",
            Self::Exhausted => "EXHAUSTED",
            Self::Recovered => "RECOVERED",
            Self::Aborted => "ABORTED",
        };
        write!(f, "{s}")
    }
}

/// Events driving a retry run between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunTrigger {
    /// Begin the first attempt.
    Start,
    /// Pause before another attempt.
    Retry,
    /// Resume after the pause.
    Resume,
    /// Accept the latest successful outcome.
    Accept,
    /// Give up without recovery.
    Exhaust,
    /// Give up and take the recovery value.
    Recover,
    /// Give up because recovery failed.
    Abort,
    /// Stop because of an external cancellation signal.
    Cancel,
}

static TRANSITIONS: &TransitionTable<RunState, RunTrigger> = &[
    ((RunState::Idle, RunTrigger::Start), RunState::Running),
    ((RunState::Idle, RunTrigger::Cancel), RunState::Aborted),
    ((RunState::Running, RunTrigger::Retry), RunState::Waiting),
    ((RunState::Running, RunTrigger::Accept), RunState::Succeeded),
    ((RunState::Running, RunTrigger::Exhaust), RunState::Exhausted),
    ((RunState::Running, RunTrigger::Recover), RunState::Recovered),
    ((RunState::Running, RunTrigger::Abort), RunState::Aborted),
    ((RunState::Running, RunTrigger::Cancel), RunState::Aborted),
    ((RunState::Waiting, RunTrigger::Resume), RunState::Running),
    ((RunState::Waiting, RunTrigger::Cancel), RunState::Aborted),
];

/// Tracks the state of one run, rejecting transitions outside the lifecycle.
#[derive(Debug)]
pub(crate) struct RunLifecycle {
    fsm: FiniteStateMachine<RunState, RunTrigger>,
}

impl RunLifecycle {
    pub(crate) fn new() -> Self {
        Self {
            fsm: FiniteStateMachine::new(RunState::Idle, TRANSITIONS),
        }
    }

    pub(crate) const fn state(&self) -> RunState {
        self.fsm.state()
    }

    pub(crate) fn trigger(&mut self, trigger: RunTrigger) -> Result<RunState, InvalidStateTrigger> {
        let state = self.fsm.trigger(trigger)?;
        tracing::trace!("Retry run {trigger:?} -> {state}");
        Ok(state)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new_lifecycle_is_idle() {
        let lifecycle = RunLifecycle::new();
        assert_eq!(lifecycle.state(), RunState::Idle);
        assert!(!lifecycle.state().is_terminal());
    }

    #[rstest]
    fn test_retry_cycle_then_success() {
        let mut lifecycle = RunLifecycle::new();
        lifecycle.trigger(RunTrigger::Start).unwrap();
        lifecycle.trigger(RunTrigger::Retry).unwrap();
        assert_eq!(lifecycle.state(), RunState::Waiting);
        lifecycle.trigger(RunTrigger::Resume).unwrap();
        assert_eq!(lifecycle.trigger(RunTrigger::Accept), Ok(RunState::Succeeded));
        assert!(lifecycle.state().is_terminal());
    }

    #[rstest]
    #[case(RunTrigger::Exhaust, RunState::Exhausted)]
    #[case(RunTrigger::Recover, RunState::Recovered)]
    #[case(RunTrigger::Abort, RunState::Aborted)]
    #[case(RunTrigger::Cancel, RunState::Aborted)]
    fn test_terminal_transitions_from_running(
        #[case] trigger: RunTrigger,
        #[case] expected: RunState,
    ) {
        let mut lifecycle = RunLifecycle::new();
        lifecycle.trigger(RunTrigger::Start).unwrap();
        assert_eq!(lifecycle.trigger(trigger), Ok(expected));
        assert!(expected.is_terminal());
    }

    #[rstest]
    #[case(RunTrigger::Start)]
    #[case(RunTrigger::Retry)]
    #[case(RunTrigger::Cancel)]
    fn test_terminal_state_rejects_triggers(#[case] trigger: RunTrigger) {
        let mut lifecycle = RunLifecycle::new();
        lifecycle.trigger(RunTrigger::Start).unwrap();
        lifecycle.trigger(RunTrigger::Accept).unwrap();

        let err = lifecycle.trigger(trigger).unwrap_err();
        assert_eq!(err.current_state, "Succeeded");
        assert_eq!(lifecycle.state(), RunState::Succeeded);
    }

    #[rstest]
    fn test_cancel_before_start() {
        let mut lifecycle = RunLifecycle::new();
        assert_eq!(lifecycle.trigger(RunTrigger::Cancel), Ok(RunState::Aborted));
    }

    #[rstest]
    fn test_display() {
        assert_eq!(RunState::Waiting.to_string(), "WAITING");
        assert_eq!(RunState::Recovered.to_string(), "RECOVERED");
    }
}

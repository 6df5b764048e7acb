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

//! Defines a generic `Finite-State Machine` (FSM).
//!
//! The FSM operates with a static state-transition table of tuples and enums. The
//! intended use case is to ensure correct state transitions, as well as holding a
//! deterministic state value.
//!
//! # References
//!
//! <https://en.wikipedia.org/wiki/Finite-state_machine>

use std::fmt::Debug;

/// Error representing an invalid trigger for the current state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid state transition: {current_state} -> {trigger}")]
pub struct InvalidStateTrigger {
    /// The current state as a string.
    pub current_state: String,
    /// The trigger as a string.
    pub trigger: String,
}

/// A state-transition table: `((from_state, trigger), to_state)` entries.
pub type TransitionTable<S, T> = [((S, T), S)];

/// Provides a generic finite state machine driven by a static transition table.
///
/// # Examples
///
/// ```
/// use steadfast_core::fsm::{FiniteStateMachine, TransitionTable};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum State {
///     Idle,
///     Running,
///     Stopped,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Trigger {
///     Start,
///     Stop,
/// }
///
/// static TABLE: &TransitionTable<State, Trigger> = &[
///     ((State::Idle, Trigger::Start), State::Running),
///     ((State::Running, Trigger::Stop), State::Stopped),
/// ];
///
/// let mut fsm = FiniteStateMachine::new(State::Idle, TABLE);
/// fsm.trigger(Trigger::Start).unwrap();
/// assert_eq!(fsm.state(), State::Running);
///
/// assert!(fsm.trigger(Trigger::Start).is_err());
/// assert_eq!(fsm.state(), State::Running);
/// ```
pub struct FiniteStateMachine<S: 'static, T: 'static> {
    state: S,
    table: &'static TransitionTable<S, T>,
}

impl<S, T> Debug for FiniteStateMachine<S, T>
where
    S: Debug + 'static,
    T: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(FiniteStateMachine))
            .field("state", &self.state)
            .field("transitions", &self.table.len())
            .finish()
    }
}

impl<S, T> FiniteStateMachine<S, T>
where
    S: Copy + Eq + Debug + 'static,
    T: Copy + Eq + Debug + 'static,
{
    /// Creates a new [`FiniteStateMachine`] in the given `initial_state`.
    ///
    /// # Panics
    ///
    /// Panics if `table` is empty.
    #[must_use]
    pub fn new(initial_state: S, table: &'static TransitionTable<S, T>) -> Self {
        assert!(!table.is_empty(), "state transition table cannot be empty");
        Self {
            state: initial_state,
            table,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> S {
        self.state
    }

    /// Returns whether no transition leaves the current state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.table.iter().any(|((from, _), _)| *from == self.state)
    }

    /// Processes the FSM with the given `trigger`, returning the new state.
    ///
    /// The state is left unchanged when the transition is rejected.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidStateTrigger`] if the current state and `trigger` combination
    /// is not found in the transition table.
    pub fn trigger(&mut self, trigger: T) -> Result<S, InvalidStateTrigger> {
        let next = self
            .table
            .iter()
            .find(|((from, t), _)| *from == self.state && *t == trigger)
            .map(|(_, to)| *to);

        match next {
            Some(state) => {
                self.state = state;
                Ok(state)
            }
            None => Err(InvalidStateTrigger {
                current_state: format!("{:?}", self.state),
                trigger: format!("{trigger:?}"),
            }),
        }
    }
}

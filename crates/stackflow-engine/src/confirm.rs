//! Confirmation gate for destructive operations.
//!
//! A small state machine: one exact affirmative token for every
//! environment, and for protected tiers a second token naming the
//! environment itself. Any other input aborts. Input arrives through a
//! pluggable token source so tests can drive the gate without a terminal.

use std::io;
use stackflow_core::Environment;

/// The literal primary affirmative token.
pub const PRIMARY_TOKEN: &str = "yes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Init,
    AwaitingPrimary,
    AwaitingSecondary,
    Confirmed,
    Aborted,
}

pub struct ConfirmationGate {
    environment: Environment,
    state: GateState,
}

impl ConfirmationGate {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            state: GateState::Init,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == GateState::Confirmed
    }

    /// Open the gate for input. The caller presents its warning summary
    /// before feeding tokens.
    pub fn open(&mut self) -> GateState {
        if self.state == GateState::Init {
            self.state = GateState::AwaitingPrimary;
        }
        self.state
    }

    /// The literal expected next, for prompt rendering. `None` once the
    /// gate is terminal.
    pub fn expected_token(&self) -> Option<&str> {
        match self.state {
            GateState::AwaitingPrimary => Some(PRIMARY_TOKEN),
            GateState::AwaitingSecondary => Some(self.environment.as_str()),
            _ => None,
        }
    }

    /// Feed one token. Only an exact literal match advances; anything
    /// else transitions to `Aborted` and the operation must not proceed.
    pub fn submit(&mut self, token: &str) -> GateState {
        self.state = match self.state {
            GateState::AwaitingPrimary if token == PRIMARY_TOKEN => {
                if self.environment.is_protected() {
                    GateState::AwaitingSecondary
                } else {
                    GateState::Confirmed
                }
            }
            GateState::AwaitingSecondary if token == self.environment.as_str() => {
                GateState::Confirmed
            }
            GateState::AwaitingPrimary | GateState::AwaitingSecondary => GateState::Aborted,
            // Terminal states and an unopened gate do not move.
            state => state,
        };
        self.state
    }

    /// Drive the gate to a terminal state from a token source. The source
    /// receives the expected literal so interactive callers can render a
    /// prompt; tests ignore it and feed scripted input.
    pub fn run<F>(mut self, mut next_token: F) -> io::Result<GateState>
    where
        F: FnMut(&str) -> io::Result<String>,
    {
        self.open();
        while let Some(expected) = self.expected_token().map(str::to_string) {
            let token = next_token(&expected)?;
            self.submit(token.trim());
        }
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[&str]) -> impl FnMut(&str) -> io::Result<String> + use<> {
        let mut queue: Vec<String> = input.iter().rev().map(|s| s.to_string()).collect();
        move |_expected| Ok(queue.pop().unwrap_or_default())
    }

    #[test]
    fn refusal_aborts() {
        let gate = ConfirmationGate::new(Environment::Dev);
        assert_eq!(gate.run(tokens(&["no"])).unwrap(), GateState::Aborted);
    }

    #[test]
    fn unprotected_tier_needs_one_token() {
        let gate = ConfirmationGate::new(Environment::Dev);
        assert_eq!(gate.run(tokens(&["yes"])).unwrap(), GateState::Confirmed);
    }

    #[test]
    fn protected_tier_needs_the_environment_name_too() {
        let gate = ConfirmationGate::new(Environment::Prod);
        assert_eq!(
            gate.run(tokens(&["yes", "prod"])).unwrap(),
            GateState::Confirmed
        );
    }

    #[test]
    fn mistyped_second_token_aborts() {
        let gate = ConfirmationGate::new(Environment::Prod);
        assert_eq!(
            gate.run(tokens(&["yes", "production"])).unwrap(),
            GateState::Aborted
        );
    }

    #[test]
    fn empty_second_token_aborts() {
        let gate = ConfirmationGate::new(Environment::Prod);
        assert_eq!(gate.run(tokens(&["yes"])).unwrap(), GateState::Aborted);
    }

    #[test]
    fn primary_token_is_exact_match_only() {
        for attempt in ["y", "YES", "Yes", "yes!"] {
            let gate = ConfirmationGate::new(Environment::Staging);
            assert_eq!(
                gate.run(tokens(&[attempt])).unwrap(),
                GateState::Aborted,
                "token {attempt:?} must abort"
            );
        }
    }

    #[test]
    fn protected_tier_walks_through_awaiting_secondary() {
        let mut gate = ConfirmationGate::new(Environment::Prod);
        assert_eq!(gate.state(), GateState::Init);
        assert_eq!(gate.open(), GateState::AwaitingPrimary);
        assert_eq!(gate.submit("yes"), GateState::AwaitingSecondary);
        assert_eq!(gate.expected_token(), Some("prod"));
        assert_eq!(gate.submit("prod"), GateState::Confirmed);
        assert!(gate.is_confirmed());
    }

    #[test]
    fn terminal_states_do_not_move() {
        let mut gate = ConfirmationGate::new(Environment::Dev);
        gate.open();
        gate.submit("nope");
        assert_eq!(gate.state(), GateState::Aborted);
        assert_eq!(gate.submit("yes"), GateState::Aborted);
    }

    #[test]
    fn unopened_gate_ignores_input() {
        let mut gate = ConfirmationGate::new(Environment::Dev);
        assert_eq!(gate.submit("yes"), GateState::Init);
        assert!(!gate.is_confirmed());
    }
}

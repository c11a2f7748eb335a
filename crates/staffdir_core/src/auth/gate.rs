//! Access gate and its pending-action value object.
//!
//! # Invariants
//! - A pending action runs its callback at most once; the value is consumed
//!   by `confirm` or `cancel`.
//! - A denied confirmation drops the callback without running it.
//! - Entered secrets are never logged.

use crate::auth::action::GuardedAction;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authorization capability consulted by the gate.
pub trait AccessCheck {
    /// Returns whether `secret` authorizes `action`.
    fn authorize(&self, action: GuardedAction, secret: &str) -> bool;
}

/// Exact-match check against one shared secret.
///
/// With no configured secret every request is denied.
#[derive(Clone, Default)]
pub struct SharedSecretCheck {
    secret: Option<String>,
}

impl SharedSecretCheck {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|value| !value.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

impl std::fmt::Debug for SharedSecretCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretCheck")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AccessCheck for SharedSecretCheck {
    fn authorize(&self, _action: GuardedAction, secret: &str) -> bool {
        self.secret.as_deref() == Some(secret)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    Denied(GuardedAction),
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(_) => write!(f, "Incorrect password"),
        }
    }
}

impl Error for AccessError {}

/// Gate wrapping guarded callbacks.
#[derive(Debug, Clone)]
pub struct AccessGate<C: AccessCheck> {
    check: C,
}

impl<C: AccessCheck> AccessGate<C> {
    pub fn new(check: C) -> Self {
        Self { check }
    }

    /// Wraps `run` so it only executes after a successful confirmation.
    pub fn request<F>(&self, action: GuardedAction, run: F) -> PendingAction<'_, C, F> {
        PendingAction {
            gate: self,
            action,
            run,
        }
    }
}

/// One guarded action awaiting its secret.
#[must_use = "a pending action does nothing until confirmed"]
pub struct PendingAction<'g, C: AccessCheck, F> {
    gate: &'g AccessGate<C>,
    action: GuardedAction,
    run: F,
}

impl<C: AccessCheck, F> PendingAction<'_, C, F> {
    pub fn action(&self) -> GuardedAction {
        self.action
    }

    /// Runs the callback when `secret` is accepted.
    pub fn confirm<T>(self, secret: &str) -> Result<T, AccessError>
    where
        F: FnOnce() -> T,
    {
        if !self.gate.check.authorize(self.action, secret) {
            warn!(
                "event=access_gate module=auth status=denied action={}",
                self.action
            );
            return Err(AccessError::Denied(self.action));
        }
        info!(
            "event=access_gate module=auth status=granted action={}",
            self.action
        );
        Ok((self.run)())
    }

    /// Discards the callback.
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::{AccessCheck, AccessError, AccessGate, SharedSecretCheck};
    use crate::auth::action::GuardedAction;
    use std::cell::Cell;

    fn gate() -> AccessGate<SharedSecretCheck> {
        AccessGate::new(SharedSecretCheck::new(Some("letmein".to_string())))
    }

    #[test]
    fn correct_secret_runs_callback_once() {
        let calls = Cell::new(0);
        let result = gate()
            .request(GuardedAction::Edit, || {
                calls.set(calls.get() + 1);
                "opened"
            })
            .confirm("letmein");
        assert_eq!(result, Ok("opened"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn wrong_secret_never_runs_callback() {
        let calls = Cell::new(0);
        for attempt in ["", "LETMEIN", "letmein ", "nope"] {
            let err = gate()
                .request(GuardedAction::Delete, || calls.set(calls.get() + 1))
                .confirm(attempt)
                .expect_err("wrong secret must be denied");
            assert_eq!(err, AccessError::Denied(GuardedAction::Delete));
            assert_eq!(err.to_string(), "Incorrect password");
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn cancel_discards_callback() {
        let calls = Cell::new(0);
        gate()
            .request(GuardedAction::Export, || calls.set(calls.get() + 1))
            .cancel();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unconfigured_secret_denies_everything() {
        let check = SharedSecretCheck::new(Some(String::new()));
        assert!(!check.is_configured());
        for action in GuardedAction::ALL {
            assert!(!check.authorize(action, ""));
        }
    }

    #[test]
    fn custom_check_can_scope_by_action() {
        struct ExportOnly;
        impl AccessCheck for ExportOnly {
            fn authorize(&self, action: GuardedAction, _secret: &str) -> bool {
                action == GuardedAction::Export
            }
        }

        let gate = AccessGate::new(ExportOnly);
        assert!(gate.request(GuardedAction::Export, || ()).confirm("x").is_ok());
        assert!(gate.request(GuardedAction::Edit, || ()).confirm("x").is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", SharedSecretCheck::new(Some("hunter2".to_string())));
        assert!(!rendered.contains("hunter2"));
    }
}

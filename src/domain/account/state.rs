//! Session state container: app-owned, SDK-provided update logic.

use super::Session;
use rust_decimal::Decimal;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No game running; the start form is shown.
    #[default]
    Idle,
    /// Account-open request sent, no response yet.
    Starting,
    /// Account open; push feeds are live.
    Running,
}

/// Identity and balance of the current player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    status: SessionStatus,
    session: Option<Session>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn balance(&self) -> Decimal {
        self.session
            .as_ref()
            .map(|s| s.balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Mark the account-open request as sent.
    pub fn begin(&mut self) {
        self.status = SessionStatus::Starting;
        self.session = None;
    }

    /// Install the freshly opened account.
    pub fn open(&mut self, session: Session) {
        self.status = SessionStatus::Running;
        self.session = Some(session);
    }

    /// Account-open failed: back to idle, nothing retained.
    pub fn fail(&mut self) {
        self.status = SessionStatus::Idle;
        self.session = None;
    }

    /// Replace the balance from a push event. No-op when no account is open.
    pub fn set_balance(&mut self, balance: Decimal) -> bool {
        match self.session.as_mut() {
            Some(session) if self.status == SessionStatus::Running => {
                session.balance = balance;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

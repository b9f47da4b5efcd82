//! Reservation flow state machine.
//!
//! ```text
//! Idle --checkout--> AwaitingConfirmation --confirm--> Reserving --ok--> NavigatedToCheckout
//!  ^                        |                              |
//!  +--------cancel----------+                              +--failed--> Idle
//! ```
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReservationPhase {
    #[default]
    Idle,
    AwaitingConfirmation,
    Reserving,
    NavigatedToCheckout,
}

impl fmt::Display for ReservationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation => "awaiting confirmation",
            Self::Reserving => "reserving",
            Self::NavigatedToCheckout => "at checkout",
        })
    }
}

/// Input problems that block checkout before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select at least one seat to continue.")]
    NoSeats,
    #[error("Please select a pickup point.")]
    MissingPickup,
    #[error("Please select a drop point.")]
    MissingDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {phase}")]
pub struct FlowError {
    pub action: &'static str,
    pub phase: ReservationPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

/// Check the draft booking is complete enough to reserve.
///
/// # Errors
///
/// Returns the first missing piece: seats, then pickup, then drop.
pub fn validate_draft(
    seat_count: usize,
    pickup: Option<&str>,
    drop: Option<&str>,
) -> Result<(), ValidationError> {
    if seat_count == 0 {
        return Err(ValidationError::NoSeats);
    }
    if pickup.is_none_or(str::is_empty) {
        return Err(ValidationError::MissingPickup);
    }
    if drop.is_none_or(str::is_empty) {
        return Err(ValidationError::MissingDrop);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFlow {
    phase: ReservationPhase,
}

impl ReservationFlow {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: ReservationPhase::Idle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> ReservationPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, ReservationPhase::Idle)
    }

    #[must_use]
    pub const fn confirmation_open(&self) -> bool {
        matches!(self.phase, ReservationPhase::AwaitingConfirmation)
    }

    fn transition(
        &mut self,
        action: &'static str,
        from: ReservationPhase,
        to: ReservationPhase,
    ) -> Result<(), FlowError> {
        if self.phase != from {
            return Err(FlowError {
                action,
                phase: self.phase,
            });
        }
        log::debug!("reservation flow: {} -> {to}", self.phase);
        self.phase = to;
        Ok(())
    }

    /// Idle → `AwaitingConfirmation`.
    ///
    /// # Errors
    ///
    /// Fails unless the flow is idle.
    pub fn open_confirmation(&mut self) -> Result<(), FlowError> {
        self.transition(
            "open checkout",
            ReservationPhase::Idle,
            ReservationPhase::AwaitingConfirmation,
        )
    }

    /// `AwaitingConfirmation` → Idle, without any request.
    ///
    /// # Errors
    ///
    /// Fails unless the confirmation dialog is open.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        self.transition(
            "cancel",
            ReservationPhase::AwaitingConfirmation,
            ReservationPhase::Idle,
        )
    }

    /// `AwaitingConfirmation` → Reserving.
    ///
    /// # Errors
    ///
    /// Fails unless the confirmation dialog is open.
    pub fn begin_reserving(&mut self) -> Result<(), FlowError> {
        self.transition(
            "confirm",
            ReservationPhase::AwaitingConfirmation,
            ReservationPhase::Reserving,
        )
    }

    /// Reserving → `NavigatedToCheckout` on success, Idle on failure.
    ///
    /// # Errors
    ///
    /// Fails unless a reservation is in flight.
    pub fn finish(&mut self, succeeded: bool) -> Result<(), FlowError> {
        let to = if succeeded {
            ReservationPhase::NavigatedToCheckout
        } else {
            ReservationPhase::Idle
        };
        self.transition("finish reservation", ReservationPhase::Reserving, to)
    }

    pub fn reset(&mut self) {
        self.phase = ReservationPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_checkout() {
        let mut flow = ReservationFlow::new();
        flow.open_confirmation().unwrap();
        assert!(flow.confirmation_open());
        flow.begin_reserving().unwrap();
        flow.finish(true).unwrap();
        assert_eq!(flow.phase(), ReservationPhase::NavigatedToCheckout);
    }

    #[test]
    fn cancel_and_failure_return_to_idle() {
        let mut flow = ReservationFlow::new();
        flow.open_confirmation().unwrap();
        flow.cancel().unwrap();
        assert!(flow.is_idle());

        flow.open_confirmation().unwrap();
        flow.begin_reserving().unwrap();
        flow.finish(false).unwrap();
        assert!(flow.is_idle());
    }

    #[test]
    fn invalid_transitions_leave_phase_unchanged() {
        let mut flow = ReservationFlow::new();
        let err = flow.begin_reserving().unwrap_err();
        assert_eq!(err.phase, ReservationPhase::Idle);
        assert_eq!(err.to_string(), "cannot confirm while idle");
        assert!(flow.cancel().is_err());
        assert!(flow.finish(true).is_err());
        assert!(flow.is_idle());

        flow.open_confirmation().unwrap();
        flow.begin_reserving().unwrap();
        assert!(flow.open_confirmation().is_err());
        assert!(flow.cancel().is_err());
        assert_eq!(flow.phase(), ReservationPhase::Reserving);
    }

    #[test]
    fn validation_checks_seats_then_points() {
        assert_eq!(
            validate_draft(0, Some("p"), Some("d")),
            Err(ValidationError::NoSeats)
        );
        assert_eq!(
            validate_draft(2, None, Some("d")),
            Err(ValidationError::MissingPickup)
        );
        assert_eq!(
            validate_draft(2, Some("p"), Some("")),
            Err(ValidationError::MissingDrop)
        );
        assert_eq!(validate_draft(1, Some("p"), Some("d")), Ok(()));
    }
}

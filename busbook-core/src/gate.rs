//! Latest-wins gating for overlapping requests.
//!
//! Every request takes a [`Ticket`] before it goes out; when the response comes
//! back it is applied only if no newer ticket has been issued since.

/// Proof of which request a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestGate {
    latest: u64,
}

impl RequestGate {
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: 0 }
    }

    /// Issue a ticket that supersedes all earlier ones.
    pub fn issue(&mut self) -> Ticket {
        self.latest = self.latest.wrapping_add(1);
        Ticket(self.latest)
    }

    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Supersede every outstanding ticket without starting a new request.
    pub fn invalidate(&mut self) {
        self.latest = self.latest.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut gate = RequestGate::new();
        let first = gate.issue();
        assert!(gate.is_current(first));
        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
        gate.invalidate();
        assert!(!gate.is_current(second));
    }
}

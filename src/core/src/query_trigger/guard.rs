use std::fmt;

/// Identifies one dispatched query. Tickets increase with every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out tickets and tells whether a response is still wanted.
///
/// A response may be applied only if its ticket is the latest one issued;
/// anything older was superseded and must be discarded on arrival.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
}

impl RequestSequencer {
    pub fn next(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn latest(&self) -> Option<Ticket> {
        (self.issued > 0).then_some(Ticket(self.issued))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut seq = RequestSequencer::default();
        assert_eq!(seq.latest(), None);

        let a = seq.next();
        assert!(seq.is_current(a));

        let b = seq.next();
        assert!(b > a);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
        assert_eq!(seq.latest(), Some(b));
    }
}

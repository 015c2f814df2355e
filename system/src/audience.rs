use crate::types::ConnectionId;

/// Who a dispatched message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    AllExcept(ConnectionId),
    Only(ConnectionId),
}

impl Audience {
    pub fn includes(&self, connection_id: ConnectionId) -> bool {
        match *self {
            Audience::All => true,
            Audience::AllExcept(excluded) => connection_id != excluded,
            Audience::Only(target) => connection_id == target,
        }
    }

    /// Picks the recipients out of the currently open connections, keeping
    /// their order.
    pub fn select<I>(&self, open: I) -> Vec<ConnectionId>
    where
        I: IntoIterator<Item = ConnectionId>,
    {
        open.into_iter().filter(|id| self.includes(*id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_excludes_only_the_sender() {
        assert_eq!(Audience::AllExcept(2).select(vec![1, 2, 3]), vec![1, 3]);
    }

    #[test]
    fn it_selects_everyone() {
        assert_eq!(Audience::All.select(vec![3, 1]), vec![3, 1]);
    }

    #[test]
    fn it_selects_a_single_connection() {
        assert_eq!(Audience::Only(3).select(vec![1, 2, 3]), vec![3]);
        assert!(Audience::Only(9).select(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn it_selects_nobody_when_sender_is_alone() {
        assert!(Audience::AllExcept(1).select(vec![1]).is_empty());
    }
}

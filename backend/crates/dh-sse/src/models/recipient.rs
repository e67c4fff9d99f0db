/// Target of a delivery
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// One subscriber, by request id
    Connection(String),
    /// Every registered subscriber
    All,
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(request_id) => write!(f, "{request_id}"),
            Self::All => write!(f, "*"),
        }
    }
}

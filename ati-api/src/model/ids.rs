use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an order, usually generated locally at placement.
///
/// The platform reports order updates in a file named after this id, so the
/// token must not contain `_` (see the update classifier) or `|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Key of a position: one instrument held in one account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    instrument: String,
    account: String,
}

impl PositionKey {
    pub fn new(instrument: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            account: account.into(),
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.instrument, self.account)
    }
}

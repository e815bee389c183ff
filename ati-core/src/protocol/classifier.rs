//! Routing of update files by name.
//!
//! The platform writes three kinds of files into the update directory and
//! the only thing that tells them apart is the file name:
//!
//! | rule | pattern                                 | kind       |
//! |------|-----------------------------------------|------------|
//! | 1    | `<instrument>_<account>_Position.txt`   | position   |
//! | 2    | `<stem>.txt`, stem without `_`          | order      |
//! | 3    | any other `<stem>.txt`                  | connection |
//!
//! Rules are applied in that order, so a position file is never mistaken for
//! a connection even though its stem also contains `_`.
//!
//! Rules 2 and 3 are only a first guess. A connection named without `_`
//! (`Sim101.txt`) and an order id containing `_` (`test_order.txt`) both
//! land on the wrong side, so [`parse`](super::parse) settles order versus
//! connection from the content: `;`-separated fields mean an order update,
//! a single token means a connection state.
//!
//! Position names are split at the *last* `_` before the suffix: everything
//! before it is the instrument, everything after it the account. A file for
//! an account whose name contains `_` is therefore attributed to the wrong
//! instrument/account pair. The platform offers no escaping, so there is no
//! correct split in that case; lookups for such accounts will miss.

use ati::{OrderId, PositionKey};
use std::fmt;

pub const UPDATE_EXTENSION: &str = ".txt";
pub const POSITION_SUFFIX: &str = "_Position.txt";
pub const KEY_SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Position,
    Order,
    Connection,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateKind::Position => f.write_str("position"),
            UpdateKind::Order => f.write_str("order"),
            UpdateKind::Connection => f.write_str("connection"),
        }
    }
}

/// The record an update file refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpdateTarget {
    Position(PositionKey),
    Order(OrderId),
    Connection(String),
}

impl UpdateTarget {
    pub fn kind(&self) -> UpdateKind {
        match self {
            UpdateTarget::Position(_) => UpdateKind::Position,
            UpdateTarget::Order(_) => UpdateKind::Order,
            UpdateTarget::Connection(_) => UpdateKind::Connection,
        }
    }
}

impl fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateTarget::Position(key) => write!(f, "position {}", key),
            UpdateTarget::Order(id) => write!(f, "order {}", id),
            UpdateTarget::Connection(name) => write!(f, "connection {}", name),
        }
    }
}

/// Classifies an update file name.
///
/// Returns `None` for names that are not update files: anything without the
/// `.txt` extension, hidden files, an empty stem, or a position file whose
/// prefix does not split into a non-empty instrument and account.
pub fn classify(file_name: &str) -> Option<UpdateTarget> {
    if file_name.starts_with('.') {
        return None;
    }

    if let Some(prefix) = file_name.strip_suffix(POSITION_SUFFIX) {
        let (instrument, account) = prefix.rsplit_once(KEY_SEPARATOR)?;
        if instrument.is_empty() || account.is_empty() {
            return None;
        }
        return Some(UpdateTarget::Position(PositionKey::new(instrument, account)));
    }

    let stem = file_name.strip_suffix(UPDATE_EXTENSION)?;
    if stem.is_empty() {
        return None;
    }

    if stem.contains(KEY_SEPARATOR) {
        Some(UpdateTarget::Connection(stem.to_string()))
    } else {
        Some(UpdateTarget::Order(OrderId::new(stem)))
    }
}

//! # ATI Core
//!
//! Client side of the NinjaTrader Automated Trading Interface file protocol.
//!
//! Commands are encoded as `|`-delimited lines and dropped as files into the
//! platform's `incoming` directory. The platform reports positions, orders and
//! connection states by rewriting files in its `outgoing` directory, which a
//! background watcher mirrors into an in-memory store.
//!
//! ## Modules
//! - `protocol`: Command encoding, update file classification and parsing.
//! - `channel`: Atomic delivery of command files.
//! - `store`: Concurrent mirror of position/order/connection records.
//! - `watcher`: Update directory subscription and processing thread.
//! - `diagnostics`: Reporting bus for the watcher thread.
//! - `fs`: Command/update directory layout.
//! - `settings`: Layered configuration.
//! - `client`: The `AtiClient` handle tying it all together.

pub mod channel;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod protocol;
pub mod settings;
pub mod store;
pub mod watcher;

pub use channel::CommandChannel;
pub use client::AtiClient;
pub use diagnostics::{Diagnostics, WatchEvent};
pub use error::{AtiError, ParseError, Result, UpdateError};
pub use fs::AtiPaths;
pub use settings::Settings;
pub use store::{Record, StateStore};
pub use watcher::{FileWatcher, WatchOptions, WatcherState};

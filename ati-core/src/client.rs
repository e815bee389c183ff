//! The caller-facing handle.
//!
//! [`AtiClient`] ties the pieces together: commands go out through the
//! [`CommandChannel`], updates come back through the [`FileWatcher`] into the
//! [`StateStore`], and lookups read from the store. Every command method runs
//! on the caller's thread and returns as soon as the command file is in place.

use crate::channel::CommandChannel;
use crate::diagnostics::{Diagnostics, WatchEvent};
use crate::error::Result;
use crate::fs::AtiPaths;
use crate::settings::Settings;
use crate::store::StateStore;
use crate::watcher::{FileWatcher, WatchOptions, WatcherState};
use ati::{
    ChangeOrder, Command, Connection, Order, OrderId, PlaceOrder, Position, PositionKey,
    ReversePosition,
};
use log::info;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Generates a fresh order id (hyphenated UUID v4, no `_`).
pub fn generate_order_id() -> OrderId {
    OrderId::new(Uuid::new_v4().to_string())
}

/// Connection to the platform through its command and update directories.
///
/// Opening the client starts the watcher; [`shutdown`](Self::shutdown) stops
/// it deterministically, and dropping the client does the same. Lookups keep
/// working after shutdown and return the last mirrored state.
pub struct AtiClient {
    paths: AtiPaths,
    channel: CommandChannel,
    store: Arc<StateStore>,
    diagnostics: Diagnostics,
    watcher: Mutex<FileWatcher>,
}

impl AtiClient {
    /// Opens the client with a fresh diagnostics bus.
    pub fn open(settings: &Settings) -> Result<Self> {
        Self::open_with(settings, Diagnostics::new())
    }

    /// Opens the client, reporting watcher outcomes on `diagnostics`.
    ///
    /// Creates both directories if needed, loads the update files already
    /// present (unless disabled in `settings`), and starts watching.
    ///
    /// # Returns
    ///
    /// * `Err(AtiError::FileSystem)` if a directory cannot be created or listed.
    /// * `Err(AtiError::Watch)` if change notifications cannot be set up.
    pub fn open_with(settings: &Settings, diagnostics: Diagnostics) -> Result<Self> {
        let paths = AtiPaths::from_settings(settings);
        paths.ensure_dirs()?;

        let store = Arc::new(StateStore::new());
        let mut watcher = FileWatcher::new(
            paths.outgoing_dir(),
            Arc::clone(&store),
            diagnostics.clone(),
            WatchOptions::from(settings),
        );
        watcher.start()?;

        info!(
            "[Client] Commands to {:?}, updates from {:?}",
            paths.incoming_dir(),
            paths.outgoing_dir()
        );

        Ok(Self {
            channel: CommandChannel::new(paths.incoming_dir()),
            paths,
            store,
            diagnostics,
            watcher: Mutex::new(watcher),
        })
    }

    /// Places a new order and returns its id.
    ///
    /// An id is generated when the request carries none. The order's
    /// parameters are recorded locally once the command file is written, so
    /// later updates for the id merge onto them.
    pub fn place_order(&self, mut order: PlaceOrder) -> Result<OrderId> {
        let order_id = order
            .order_id
            .get_or_insert_with(generate_order_id)
            .clone();
        let params = order.params();

        self.channel.send(&Command::Place(order))?;
        self.store.record_placement(order_id.clone(), params);
        info!("[Client] Placed order {}", order_id);
        Ok(order_id)
    }

    /// Reverses a position with a new order and returns the order's id.
    pub fn reverse_position(&self, mut reverse: ReversePosition) -> Result<OrderId> {
        let order_id = reverse
            .order_id
            .get_or_insert_with(generate_order_id)
            .clone();
        let params = reverse.params();

        self.channel.send(&Command::Reverse(reverse))?;
        self.store.record_placement(order_id.clone(), params);
        info!("[Client] Reversing position with order {}", order_id);
        Ok(order_id)
    }

    pub fn cancel_order(&self, order_id: &OrderId, strategy_id: Option<&str>) -> Result<()> {
        self.send(Command::Cancel {
            order_id: order_id.clone(),
            strategy_id: strategy_id.map(str::to_string),
        })
    }

    pub fn cancel_all_orders(&self) -> Result<()> {
        self.send(Command::CancelAllOrders)
    }

    pub fn change_order(&self, change: ChangeOrder) -> Result<()> {
        self.send(Command::Change(change))
    }

    pub fn close_position(&self, account: &str, instrument: &str) -> Result<()> {
        self.send(Command::ClosePosition {
            account: account.to_string(),
            instrument: instrument.to_string(),
        })
    }

    /// Closes an ATM strategy.
    pub fn close_strategy(&self, strategy_id: &str) -> Result<()> {
        self.send(Command::CloseStrategy {
            strategy_id: strategy_id.to_string(),
        })
    }

    /// Cancels all orders and flattens all positions on every account.
    pub fn flatten_everything(&self) -> Result<()> {
        self.send(Command::FlattenEverything)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.channel.send(&command)?;
        info!("[Client] Sent {}", command.kind());
        Ok(())
    }

    pub fn position(&self, instrument: &str, account: &str) -> Option<Position> {
        self.store.position(&PositionKey::new(instrument, account))
    }

    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.store.order(order_id)
    }

    pub fn connection(&self, name: &str) -> Option<Connection> {
        self.store.connection(name)
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn paths(&self) -> &AtiPaths {
        &self.paths
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Shorthand for `diagnostics().subscribe()`.
    pub fn subscribe(&self) -> Receiver<WatchEvent> {
        self.diagnostics.subscribe()
    }

    pub fn watcher_state(&self) -> WatcherState {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Stops the watcher and waits for its thread to exit.
    ///
    /// Commands can still be sent afterwards; the store just stops following
    /// the update directory.
    pub fn shutdown(&self) {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
    }
}

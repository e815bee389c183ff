//! In-memory mirror of the platform's state.
//!
//! Each record kind lives in its own map behind its own `RwLock`. A write
//! swaps or merges one record while holding the write lock, so a reader sees
//! either the previous record or the new one, never a mix.

use crate::protocol::{Update, UpdateTarget};
use ati::{Connection, Order, OrderId, OrderParams, Position, PositionKey};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Any stored record, as returned by [`StateStore::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Record {
    Position(Position),
    Order(Order),
    Connection(Connection),
}

#[derive(Debug, Default)]
pub struct StateStore {
    positions: RwLock<HashMap<PositionKey, Position>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    connections: RwLock<HashMap<String, Connection>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point lookup by update target.
    pub fn get(&self, target: &UpdateTarget) -> Option<Record> {
        match target {
            UpdateTarget::Position(key) => self.position(key).map(Record::Position),
            UpdateTarget::Order(id) => self.order(id).map(Record::Order),
            UpdateTarget::Connection(name) => self.connection(name).map(Record::Connection),
        }
    }

    pub fn position(&self, key: &PositionKey) -> Option<Position> {
        read(&self.positions).get(key).cloned()
    }

    pub fn order(&self, id: &OrderId) -> Option<Order> {
        read(&self.orders).get(id).cloned()
    }

    pub fn connection(&self, name: &str) -> Option<Connection> {
        read(&self.connections).get(name).cloned()
    }

    /// Writes a decoded update.
    ///
    /// Positions and connections are replaced. For orders only the live fields
    /// change; an order not placed through this store is created with unknown
    /// original parameters.
    pub fn apply(&self, update: Update) {
        match update {
            Update::Position(position) => {
                write(&self.positions).insert(position.key().clone(), position);
            }
            Update::Connection(connection) => {
                write(&self.connections).insert(connection.name().to_string(), connection);
            }
            Update::Order(id, live) => {
                let mut orders = write(&self.orders);
                match orders.get_mut(&id) {
                    Some(order) => order.apply(live),
                    None => {
                        debug!("[Store] Order {} first seen in an update", id);
                        orders.insert(id.clone(), Order::reported(id, live));
                    }
                }
            }
        }
    }

    /// Records the original parameters of an order submitted locally.
    ///
    /// If the platform already reported on the id, its live fields are kept.
    /// Parameters that are already known are never overwritten.
    pub fn record_placement(&self, id: OrderId, params: OrderParams) {
        let mut orders = write(&self.orders);
        match orders.get_mut(&id) {
            Some(order) => {
                if !order.attach_params(params) {
                    warn!("[Store] Order {} placed twice, keeping first parameters", id);
                }
            }
            None => {
                orders.insert(id.clone(), Order::placed(id, params));
            }
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        read(&self.positions).values().cloned().collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        read(&self.orders).values().cloned().collect()
    }

    pub fn connections(&self) -> Vec<Connection> {
        read(&self.connections).values().cloned().collect()
    }
}

// Every write is a single insert or field swap, so a map behind a poisoned
// lock is still consistent.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;

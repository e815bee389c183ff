//! # ATI model
//!
//! Types shared by everything that talks to the platform's file-based
//! Automated Trading Interface: the wire enums, command requests, and the
//! position/order/connection records mirrored from update files.

#[macro_use]
mod macros;

pub mod error;
pub mod model;

pub use error::InvalidEnumValue;
pub use model::command::{ChangeOrder, Command, CommandKind, PlaceOrder, ReversePosition};
pub use model::connection::Connection;
pub use model::enums::{Action, ConnectionState, MarketPosition, OrderState, OrderType, TimeInForce};
pub use model::ids::{OrderId, PositionKey};
pub use model::order::{Order, OrderParams, OrderUpdate};
pub use model::position::Position;

pub use rust_decimal::Decimal;

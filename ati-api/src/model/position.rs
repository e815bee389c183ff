use super::enums::MarketPosition;
use super::ids::PositionKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest reported position of an account in an instrument.
///
/// Replaced wholesale on every update. A closed position stays in the store
/// as `Flat` with a zero quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    key: PositionKey,
    market_position: MarketPosition,
    quantity: i64,
    average_entry_price: Decimal,
}

impl Position {
    pub fn new(
        key: PositionKey,
        market_position: MarketPosition,
        quantity: i64,
        average_entry_price: Decimal,
    ) -> Self {
        Self {
            key,
            market_position,
            quantity,
            average_entry_price,
        }
    }

    pub fn key(&self) -> &PositionKey {
        &self.key
    }

    pub fn instrument(&self) -> &str {
        self.key.instrument()
    }

    pub fn account(&self) -> &str {
        self.key.account()
    }

    pub fn market_position(&self) -> MarketPosition {
        self.market_position
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn average_entry_price(&self) -> Decimal {
        self.average_entry_price
    }

    pub fn is_flat(&self) -> bool {
        self.market_position == MarketPosition::Flat
    }
}

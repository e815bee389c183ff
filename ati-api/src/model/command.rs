//! Typed parameters for the eight commands the platform accepts.
//!
//! Requests are plain data. Encoding to the `|`-delimited wire line lives in
//! `ati-core`.

use super::enums::{Action, OrderType, TimeInForce};
use super::ids::OrderId;
use super::order::OrderParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Command verb, the first field of every command line.
    pub enum CommandKind {
        Place => "PLACE",
        Cancel => "CANCEL",
        CancelAllOrders => "CANCELALLORDERS",
        Change => "CHANGE",
        ClosePosition => "CLOSEPOSITION",
        CloseStrategy => "CLOSESTRATEGY",
        FlattenEverything => "FLATTENEVERYTHING",
        ReversePosition => "REVERSEPOSITION",
    }
}

impl CommandKind {
    /// Number of `|`-separated fields in an encoded line, verb included.
    pub fn field_count(&self) -> usize {
        match self {
            CommandKind::Place => 13,
            CommandKind::Cancel => 3,
            CommandKind::CancelAllOrders => 1,
            CommandKind::Change => 6,
            CommandKind::ClosePosition => 3,
            CommandKind::CloseStrategy => 2,
            CommandKind::FlattenEverything => 1,
            CommandKind::ReversePosition => 12,
        }
    }
}

/// A new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub account: String,
    pub instrument: String,
    pub action: Action,
    pub quantity: u32,
    pub order_type: OrderType,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub tif: TimeInForce,
    pub oco_id: Option<String>,
    /// Generated at submission when absent.
    pub order_id: Option<OrderId>,
    pub strategy: Option<String>,
    pub strategy_id: Option<String>,
}

impl PlaceOrder {
    pub fn new(
        account: impl Into<String>,
        instrument: impl Into<String>,
        action: Action,
        quantity: u32,
        order_type: OrderType,
    ) -> Self {
        Self {
            account: account.into(),
            instrument: instrument.into(),
            action,
            quantity,
            order_type,
            limit_price: None,
            stop_price: None,
            tif: TimeInForce::default(),
            oco_id: None,
            order_id: None,
            strategy: None,
            strategy_id: None,
        }
    }

    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    pub fn with_stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    pub fn with_tif(mut self, tif: TimeInForce) -> Self {
        self.tif = tif;
        self
    }

    pub fn with_oco_id(mut self, oco_id: impl Into<String>) -> Self {
        self.oco_id = Some(oco_id.into());
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<OrderId>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_strategy_id(mut self, strategy_id: impl Into<String>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    /// The original parameters recorded for the resulting order.
    pub fn params(&self) -> OrderParams {
        OrderParams {
            account: self.account.clone(),
            instrument: self.instrument.clone(),
            action: Some(self.action),
            quantity: self.quantity,
            order_type: self.order_type,
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            tif: self.tif,
            oco_id: self.oco_id.clone(),
            strategy: self.strategy.clone(),
            strategy_id: self.strategy_id.clone(),
        }
    }
}

/// Reverses the current position in `instrument` with a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversePosition {
    pub account: String,
    pub instrument: String,
    pub quantity: u32,
    pub order_type: OrderType,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub tif: TimeInForce,
    pub oco_id: Option<String>,
    pub order_id: Option<OrderId>,
    pub strategy: Option<String>,
    pub strategy_id: Option<String>,
}

impl ReversePosition {
    pub fn new(
        account: impl Into<String>,
        instrument: impl Into<String>,
        quantity: u32,
        order_type: OrderType,
    ) -> Self {
        Self {
            account: account.into(),
            instrument: instrument.into(),
            quantity,
            order_type,
            limit_price: None,
            stop_price: None,
            tif: TimeInForce::default(),
            oco_id: None,
            order_id: None,
            strategy: None,
            strategy_id: None,
        }
    }

    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    pub fn with_stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    pub fn with_tif(mut self, tif: TimeInForce) -> Self {
        self.tif = tif;
        self
    }

    pub fn with_oco_id(mut self, oco_id: impl Into<String>) -> Self {
        self.oco_id = Some(oco_id.into());
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<OrderId>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_strategy_id(mut self, strategy_id: impl Into<String>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    pub fn params(&self) -> OrderParams {
        OrderParams {
            account: self.account.clone(),
            instrument: self.instrument.clone(),
            action: None,
            quantity: self.quantity,
            order_type: self.order_type,
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            tif: self.tif,
            oco_id: self.oco_id.clone(),
            strategy: self.strategy.clone(),
            strategy_id: self.strategy_id.clone(),
        }
    }
}

/// Modifies a working order. Omitted values are sent as empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOrder {
    pub order_id: OrderId,
    pub quantity: Option<u32>,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub strategy_id: Option<String>,
}

impl ChangeOrder {
    pub fn new(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
            quantity: None,
            limit_price: None,
            stop_price: None,
            strategy_id: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    pub fn with_stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    pub fn with_strategy_id(mut self, strategy_id: impl Into<String>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }
}

/// A command ready to be encoded and dropped into the command directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Place(PlaceOrder),
    Cancel {
        order_id: OrderId,
        strategy_id: Option<String>,
    },
    CancelAllOrders,
    Change(ChangeOrder),
    ClosePosition {
        account: String,
        instrument: String,
    },
    CloseStrategy {
        strategy_id: String,
    },
    FlattenEverything,
    Reverse(ReversePosition),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Place(_) => CommandKind::Place,
            Command::Cancel { .. } => CommandKind::Cancel,
            Command::CancelAllOrders => CommandKind::CancelAllOrders,
            Command::Change(_) => CommandKind::Change,
            Command::ClosePosition { .. } => CommandKind::ClosePosition,
            Command::CloseStrategy { .. } => CommandKind::CloseStrategy,
            Command::FlattenEverything => CommandKind::FlattenEverything,
            Command::Reverse(_) => CommandKind::ReversePosition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_place_defaults() {
        let order = PlaceOrder::new("Sim101", "ES 12-23", Action::Buy, 1, OrderType::Market);
        assert_eq!(order.tif, TimeInForce::Day);
        assert!(order.order_id.is_none());
        assert!(order.limit_price.is_none());
    }

    #[test]
    fn test_reverse_params_have_no_action() {
        let reverse = ReversePosition::new("Sim101", "NQ 12-23", 3, OrderType::Limit)
            .with_limit_price(dec!(15000.75))
            .with_tif(TimeInForce::Gtc);
        let params = reverse.params();
        assert_eq!(params.action, None);
        assert_eq!(params.quantity, 3);
        assert_eq!(params.limit_price, Some(dec!(15000.75)));
        assert_eq!(params.tif, TimeInForce::Gtc);
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Command::FlattenEverything.kind(), CommandKind::FlattenEverything);
        let change = Command::Change(ChangeOrder::new("abc").with_quantity(2));
        assert_eq!(change.kind(), CommandKind::Change);
        assert_eq!(change.kind().to_string(), "CHANGE");
    }
}

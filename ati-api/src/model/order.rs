use super::enums::{Action, OrderState, OrderType, TimeInForce};
use super::ids::OrderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameters an order was submitted with. Fixed at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParams {
    pub account: String,
    pub instrument: String,
    /// `None` for orders created by a position reversal, where the platform
    /// picks the side.
    pub action: Option<Action>,
    pub quantity: u32,
    pub order_type: OrderType,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub tif: TimeInForce,
    pub oco_id: Option<String>,
    pub strategy: Option<String>,
    pub strategy_id: Option<String>,
}

/// Live fields of an order as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    state: OrderState,
    filled: u32,
    average_fill_price: Option<Decimal>,
}

impl OrderUpdate {
    pub fn new(state: OrderState, filled: u32, average_fill_price: Option<Decimal>) -> Self {
        Self {
            state,
            filled,
            average_fill_price,
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn filled(&self) -> u32 {
        self.filled
    }

    /// `None` until the first fill.
    pub fn average_fill_price(&self) -> Option<Decimal> {
        self.average_fill_price
    }
}

/// An order tracked by the bridge.
///
/// An order placed through the bridge carries its [`OrderParams`]. An order
/// first heard of through an update file has no known parameters; they are
/// filled in if the same id is later placed locally. Live fields are `None`
/// until the platform reports on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    params: Option<OrderParams>,
    live: Option<OrderUpdate>,
}

impl Order {
    /// An order submitted locally, not yet reported on.
    pub fn placed(order_id: OrderId, params: OrderParams) -> Self {
        Self {
            order_id,
            params: Some(params),
            live: None,
        }
    }

    /// An order known only from an update file.
    pub fn reported(order_id: OrderId, update: OrderUpdate) -> Self {
        Self {
            order_id,
            params: None,
            live: Some(update),
        }
    }

    /// Replaces the live fields. Original parameters are left untouched.
    pub fn apply(&mut self, update: OrderUpdate) {
        self.live = Some(update);
    }

    /// Records the original parameters if none are known yet.
    ///
    /// Returns `false` (and changes nothing) when parameters were already set.
    pub fn attach_params(&mut self, params: OrderParams) -> bool {
        if self.params.is_some() {
            return false;
        }
        self.params = Some(params);
        true
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn params(&self) -> Option<&OrderParams> {
        self.params.as_ref()
    }

    pub fn live(&self) -> Option<&OrderUpdate> {
        self.live.as_ref()
    }

    pub fn state(&self) -> Option<OrderState> {
        self.live.as_ref().map(OrderUpdate::state)
    }

    pub fn filled(&self) -> u32 {
        self.live.as_ref().map(OrderUpdate::filled).unwrap_or(0)
    }

    pub fn average_fill_price(&self) -> Option<Decimal> {
        self.live.as_ref().and_then(OrderUpdate::average_fill_price)
    }
}

//! Wire vocabularies shared by commands and update files.
//!
//! Outbound tokens (actions, order types, time-in-force) are uppercase.
//! Inbound order states use the platform's PascalCase names.

wire_enum! {
    /// Side of an order.
    pub enum Action {
        Buy => "BUY",
        Sell => "SELL",
    }
}

wire_enum! {
    /// Order kind as understood by the platform.
    pub enum OrderType {
        Market => "MARKET",
        Limit => "LIMIT",
        StopMarket => "STOPMARKET",
        StopLimit => "STOPLIMIT",
    }
}

wire_enum! {
    pub enum TimeInForce {
        Day => "DAY",
        Gtc => "GTC",
    }
}

impl Default for TimeInForce {
    fn default() -> Self {
        TimeInForce::Day
    }
}

wire_enum! {
    /// Direction of an account's position in an instrument.
    pub enum MarketPosition {
        Long => "LONG",
        Short => "SHORT",
        Flat => "FLAT",
    }
}

wire_enum! {
    /// Lifecycle state reported for an order.
    pub enum OrderState {
        Accepted => "Accepted",
        Cancelled => "Cancelled",
        Filled => "Filled",
        Initialized => "Initialized",
        PartFilled => "PartFilled",
        Rejected => "Rejected",
        Submitted => "Submitted",
        Working => "Working",
    }
}

impl OrderState {
    /// True once the platform will report no further changes for the order.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Cancelled | OrderState::Filled | OrderState::Rejected
        )
    }
}

wire_enum! {
    pub enum ConnectionState {
        Connected => "CONNECTED",
        Disconnected => "DISCONNECTED",
    }
}

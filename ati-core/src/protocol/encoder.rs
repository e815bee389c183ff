//! Command line encoding.
//!
//! Every command is one line of `|`-separated fields, the verb first. Each
//! verb has a fixed positional schema; an omitted optional value is written
//! as an empty field so the field count never varies. Values are not escaped:
//! text containing the delimiter is rejected instead.

use crate::error::{AtiError, Result};
use ati::{ChangeOrder, Command, CommandKind, OrderId, PlaceOrder, ReversePosition};
use std::fmt::Display;

pub const FIELD_DELIMITER: char = '|';

/// Encodes a command into its wire line.
///
/// # Returns
///
/// * `Ok(line)` with exactly `command.kind().field_count()` fields.
/// * `Err(AtiError::Validation)` if a required value is empty, a text value
///   contains the delimiter or a line break, or a quantity is zero.
pub fn encode(command: &Command) -> Result<String> {
    let line = LineBuilder::new(command.kind());
    let line = match command {
        Command::Place(order) => encode_place(line, order)?,
        Command::Cancel {
            order_id,
            strategy_id,
        } => line
            .required("order_id", order_id.as_str())?
            .optional("strategy_id", strategy_id.as_deref())?,
        Command::CancelAllOrders | Command::FlattenEverything => line,
        Command::Change(change) => encode_change(line, change)?,
        Command::ClosePosition {
            account,
            instrument,
        } => line
            .required("account", account)?
            .required("instrument", instrument)?,
        Command::CloseStrategy { strategy_id } => line.required("strategy_id", strategy_id)?,
        Command::Reverse(reverse) => encode_reverse(line, reverse)?,
    };
    Ok(line.finish())
}

fn encode_place(line: LineBuilder, order: &PlaceOrder) -> Result<LineBuilder> {
    let order_id = order.order_id.as_ref().map(OrderId::as_str);
    if let Some(id) = order_id {
        check_order_id(id)?;
    }
    Ok(line
        .required("account", &order.account)?
        .required("instrument", &order.instrument)?
        .value(order.action)
        .quantity(order.quantity)?
        .value(order.order_type)
        .optional_value(order.limit_price)
        .optional_value(order.stop_price)
        .value(order.tif)
        .optional("oco_id", order.oco_id.as_deref())?
        .optional("order_id", order_id)?
        .optional("strategy", order.strategy.as_deref())?
        .optional("strategy_id", order.strategy_id.as_deref())?)
}

fn encode_reverse(line: LineBuilder, reverse: &ReversePosition) -> Result<LineBuilder> {
    let order_id = reverse.order_id.as_ref().map(OrderId::as_str);
    if let Some(id) = order_id {
        check_order_id(id)?;
    }
    Ok(line
        .required("account", &reverse.account)?
        .required("instrument", &reverse.instrument)?
        .quantity(reverse.quantity)?
        .value(reverse.order_type)
        .optional_value(reverse.limit_price)
        .optional_value(reverse.stop_price)
        .value(reverse.tif)
        .optional("oco_id", reverse.oco_id.as_deref())?
        .optional("order_id", order_id)?
        .optional("strategy", reverse.strategy.as_deref())?
        .optional("strategy_id", reverse.strategy_id.as_deref())?)
}

fn encode_change(line: LineBuilder, change: &ChangeOrder) -> Result<LineBuilder> {
    let line = line.required("order_id", change.order_id.as_str())?;
    let line = match change.quantity {
        Some(quantity) => line.quantity(quantity)?,
        None => line.empty(),
    };
    Ok(line
        .optional_value(change.limit_price)
        .optional_value(change.stop_price)
        .optional("strategy_id", change.strategy_id.as_deref())?)
}

/// An order id chosen by the caller must come back as a routable update file
/// name, so it may not contain the classifier's separator or a path separator.
fn check_order_id(id: &str) -> Result<()> {
    if id.contains(&['_', '/', '\\'][..]) {
        return Err(AtiError::validation(format!(
            "order_id '{}' must not contain '_', '/' or '\\'",
            id
        )));
    }
    Ok(())
}

struct LineBuilder {
    kind: CommandKind,
    fields: Vec<String>,
}

impl LineBuilder {
    fn new(kind: CommandKind) -> Self {
        let mut fields = Vec::with_capacity(kind.field_count());
        fields.push(kind.as_str().to_string());
        Self { kind, fields }
    }

    fn required(self, name: &'static str, value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(AtiError::validation(format!("{} must not be empty", name)));
        }
        self.text(name, value)
    }

    fn optional(self, name: &'static str, value: Option<&str>) -> Result<Self> {
        match value {
            Some(value) => self.text(name, value),
            None => Ok(self.empty()),
        }
    }

    fn text(mut self, name: &'static str, value: &str) -> Result<Self> {
        if value.contains(&[FIELD_DELIMITER, '\n', '\r'][..]) {
            return Err(AtiError::validation(format!(
                "{} must not contain '{}' or line breaks: '{}'",
                name, FIELD_DELIMITER, value
            )));
        }
        self.fields.push(value.to_string());
        Ok(self)
    }

    fn quantity(self, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(AtiError::validation("quantity must be positive"));
        }
        Ok(self.value(quantity))
    }

    fn value(mut self, value: impl Display) -> Self {
        self.fields.push(value.to_string());
        self
    }

    fn optional_value(self, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.value(value),
            None => self.empty(),
        }
    }

    fn empty(mut self) -> Self {
        self.fields.push(String::new());
        self
    }

    fn finish(self) -> String {
        debug_assert_eq!(self.fields.len(), self.kind.field_count());
        self.fields.join(FIELD_DELIMITER.to_string().as_str())
    }
}

//! Decoding of update file content into records.
//!
//! | kind       | content                                   |
//! |------------|-------------------------------------------|
//! | position   | `<marketPosition>;<quantity>;<avgPrice>`  |
//! | order      | `<state>;<filled>;<avgFillPrice or empty>`|
//! | connection | `<connectionState>`                       |
//!
//! Content and every field are trimmed before conversion. Enumerated fields
//! must match the wire vocabulary exactly.

use super::classifier::UpdateTarget;
use crate::error::{ParseError, UpdateError};
use ati::{Connection, OrderId, OrderUpdate, Position, PositionKey};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const RECORD_DELIMITER: char = ';';

/// A decoded update, ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Position(Position),
    Order(OrderId, OrderUpdate),
    Connection(Connection),
}

impl Update {
    pub fn target(&self) -> UpdateTarget {
        match self {
            Update::Position(position) => UpdateTarget::Position(position.key().clone()),
            Update::Order(id, _) => UpdateTarget::Order(id.clone()),
            Update::Connection(connection) => {
                UpdateTarget::Connection(connection.name().to_string())
            }
        }
    }
}

/// Parses `content` with the schema selected by `target`.
///
/// Order and connection file names overlap (a connection without `_` in its
/// name looks like an order id, an order id with `_` looks like a
/// connection), so for those two the content shape decides: a record with
/// `;`-separated fields is an order update, a single token is a connection
/// state. The returned update's [`target`](Update::target) reflects that
/// decision and may differ from `target`.
pub fn parse(target: &UpdateTarget, content: &str) -> Result<Update, UpdateError> {
    match target {
        UpdateTarget::Position(key) => parse_position(key.clone(), content).map(Update::Position),
        UpdateTarget::Order(id) if !has_fields(content) => {
            parse_connection(id.as_str(), content).map(Update::Connection)
        }
        UpdateTarget::Order(id) => {
            parse_order_update(content).map(|update| Update::Order(id.clone(), update))
        }
        UpdateTarget::Connection(name) if has_fields(content) => parse_order_update(content)
            .map(|update| Update::Order(OrderId::new(name.as_str()), update)),
        UpdateTarget::Connection(name) => {
            parse_connection(name, content).map(Update::Connection)
        }
    }
}

fn has_fields(content: &str) -> bool {
    content.contains(RECORD_DELIMITER)
}

pub fn parse_position(key: PositionKey, content: &str) -> Result<Position, UpdateError> {
    let [market_position, quantity, price] = split_fields(content)?;
    Ok(Position::new(
        key,
        market_position.parse()?,
        parse_integer("quantity", quantity)?,
        parse_decimal("average_entry_price", price)?,
    ))
}

pub fn parse_order_update(content: &str) -> Result<OrderUpdate, UpdateError> {
    let [state, filled, price] = split_fields(content)?;
    let average_fill_price = if price.is_empty() {
        None
    } else {
        Some(parse_decimal("average_fill_price", price)?)
    };
    Ok(OrderUpdate::new(
        state.parse()?,
        parse_integer("filled", filled)?,
        average_fill_price,
    ))
}

pub fn parse_connection(name: &str, content: &str) -> Result<Connection, UpdateError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ParseError::EmptyContent.into());
    }
    Ok(Connection::new(name, content.parse()?))
}

fn split_fields(content: &str) -> Result<[&str; 3], ParseError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ParseError::EmptyContent);
    }
    let fields: Vec<&str> = content.split(RECORD_DELIMITER).map(str::trim).collect();
    match fields.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(ParseError::FieldCount {
            expected: 3,
            found: fields.len(),
        }),
    }
}

fn parse_integer<T: FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(value).map_err(|_| ParseError::InvalidDecimal {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ati::{ConnectionState, InvalidEnumValue, MarketPosition, OrderState};
    use rust_decimal_macros::dec;

    fn key() -> PositionKey {
        PositionKey::new("ES 12-23", "Sim101")
    }

    #[test]
    fn test_position_every_variant() {
        for variant in MarketPosition::ALL {
            let content = format!("{};2;4500.50", variant);
            let position = parse_position(key(), &content).unwrap();
            assert_eq!(
                position,
                Position::new(key(), *variant, 2, dec!(4500.50))
            );
        }
    }

    #[test]
    fn test_position_keeps_exact_price() {
        let position = parse_position(key(), "LONG;1;4500.50\r\n").unwrap();
        assert_eq!(position.average_entry_price(), dec!(4500.50));
        assert_eq!(position.average_entry_price().to_string(), "4500.50");
    }

    #[test]
    fn test_position_trims_fields() {
        let position = parse_position(key(), " SHORT ; 3 ; 12.25 ").unwrap();
        assert_eq!(position.market_position(), MarketPosition::Short);
        assert_eq!(position.quantity(), 3);
    }

    #[test]
    fn test_position_field_count() {
        assert_eq!(
            parse_position(key(), "LONG;1"),
            Err(UpdateError::Parse(ParseError::FieldCount {
                expected: 3,
                found: 2
            }))
        );
        assert_eq!(
            parse_position(key(), "LONG;1;2;3"),
            Err(UpdateError::Parse(ParseError::FieldCount {
                expected: 3,
                found: 4
            }))
        );
    }

    #[test]
    fn test_position_bad_numbers() {
        assert!(matches!(
            parse_position(key(), "LONG;one;1"),
            Err(UpdateError::Parse(ParseError::InvalidInteger { field: "quantity", .. }))
        ));
        assert!(matches!(
            parse_position(key(), "LONG;1;abc"),
            Err(UpdateError::Parse(ParseError::InvalidDecimal { .. }))
        ));
    }

    #[test]
    fn test_order_without_fill() {
        let update = parse_order_update("Working;0;").unwrap();
        assert_eq!(update, OrderUpdate::new(OrderState::Working, 0, None));
    }

    #[test]
    fn test_order_with_fill() {
        let update = parse_order_update("Filled;1;4500.50").unwrap();
        assert_eq!(update.state(), OrderState::Filled);
        assert_eq!(update.filled(), 1);
        assert_eq!(update.average_fill_price(), Some(dec!(4500.50)));
    }

    #[test]
    fn test_order_invalid_state() {
        assert_eq!(
            parse_order_update("INVALID;0;0"),
            Err(UpdateError::InvalidEnumValue(InvalidEnumValue::new(
                "OrderState",
                "INVALID"
            )))
        );
    }

    #[test]
    fn test_order_negative_fill_rejected() {
        assert!(matches!(
            parse_order_update("PartFilled;-1;"),
            Err(UpdateError::Parse(ParseError::InvalidInteger { field: "filled", .. }))
        ));
    }

    #[test]
    fn test_connection() {
        let connection = parse_connection("Sim101", "CONNECTED\n").unwrap();
        assert_eq!(connection, Connection::new("Sim101", ConnectionState::Connected));
        assert!(matches!(
            parse_connection("Sim101", "connected"),
            Err(UpdateError::InvalidEnumValue(_))
        ));
        assert_eq!(
            parse_connection("Sim101", "  "),
            Err(UpdateError::Parse(ParseError::EmptyContent))
        );
    }

    #[test]
    fn test_parse_dispatches_on_target() {
        let target = UpdateTarget::Order(OrderId::new("abc"));
        let update = parse(&target, "Accepted;0;").unwrap();
        assert_eq!(update.target(), target);

        let target = UpdateTarget::Connection("My_Feed".into());
        let update = parse(&target, "DISCONNECTED").unwrap();
        assert_eq!(update.target(), target);
    }

    #[test]
    fn test_single_token_under_order_name_is_a_connection() {
        let update = parse(&UpdateTarget::Order(OrderId::new("Sim101")), "CONNECTED").unwrap();
        assert_eq!(
            update,
            Update::Connection(Connection::new("Sim101", ConnectionState::Connected))
        );
        assert_eq!(update.target(), UpdateTarget::Connection("Sim101".into()));
    }

    #[test]
    fn test_record_under_connection_name_is_an_order() {
        let update = parse(&UpdateTarget::Connection("test_order".into()), "Working;0;").unwrap();
        assert_eq!(
            update,
            Update::Order(
                OrderId::new("test_order"),
                OrderUpdate::new(OrderState::Working, 0, None)
            )
        );
    }

    #[test]
    fn test_content_shape_keeps_order_errors() {
        assert_eq!(
            parse(&UpdateTarget::Order(OrderId::new("ext1")), "INVALID;0;0"),
            Err(UpdateError::InvalidEnumValue(InvalidEnumValue::new(
                "OrderState",
                "INVALID"
            )))
        );
        assert!(matches!(
            parse(&UpdateTarget::Order(OrderId::new("ext1")), "Working;0"),
            Err(UpdateError::Parse(ParseError::FieldCount { .. }))
        ));
        assert_eq!(
            parse(&UpdateTarget::Order(OrderId::new("ext1")), ""),
            Err(UpdateError::Parse(ParseError::EmptyContent))
        );
    }
}

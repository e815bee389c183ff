pub mod command;
pub mod connection;
pub mod enums;
pub mod ids;
pub mod order;
pub mod position;

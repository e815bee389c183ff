//! The file protocol: command encoding out, update classification and
//! parsing in.

pub mod classifier;
pub mod encoder;
pub mod parser;

pub use classifier::{classify, UpdateKind, UpdateTarget};
pub use encoder::encode;
pub use parser::{parse, Update};

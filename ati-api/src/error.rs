use thiserror::Error;

/// A wire string that is not part of an enum's recognized vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {type_name} value '{value}'")]
pub struct InvalidEnumValue {
    type_name: &'static str,
    value: String,
}

impl InvalidEnumValue {
    pub fn new(type_name: &'static str, value: impl Into<String>) -> Self {
        Self {
            type_name,
            value: value.into(),
        }
    }

    /// Name of the enum that rejected the value (e.g. `OrderState`).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The offending wire string, untrimmed.
    pub fn value(&self) -> &str {
        &self.value
    }
}

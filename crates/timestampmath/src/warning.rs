use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub const CONVERTED_OUT_OF_BOUNDS_TO_NULL: &str = "warning.convertedOutOfBoundsToNull";
pub const CONVERTED_DIFFERENCE_OUT_OF_BOUNDS_TO_NULL: &str =
    "warning.convertedDifferenceOutOfBoundsToNull";

/// A translatable message. The host looks up `message_id` in its catalog;
/// `default_message` is the English fallback with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message_id: &'static str,
    pub default_message: &'static str,
    pub arguments: BTreeMap<String, String>,
}

impl Warning {
    pub fn converted_out_of_bounds_to_null(timestamp: impl Into<String>) -> Self {
        Warning {
            message_id: CONVERTED_OUT_OF_BOUNDS_TO_NULL,
            default_message: "Converted timestamp {timestamp} to null because it is out of bounds.",
            arguments: BTreeMap::from([("timestamp".to_string(), timestamp.into())]),
        }
    }

    pub fn converted_difference_out_of_bounds_to_null(column: impl Into<String>) -> Self {
        Warning {
            message_id: CONVERTED_DIFFERENCE_OUT_OF_BOUNDS_TO_NULL,
            default_message: "Converted some values in {column} to null because the difference is out of bounds.",
            arguments: BTreeMap::from([("column".to_string(), column.into())]),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut message = self.default_message.to_string();
        for (name, value) in &self.arguments {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        f.write_str(&message)
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, TsMathError};
use crate::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Minimum,
    Maximum,
    Difference,
    StartOf,
}

/// Flat parameter record as stored by the host. Fields unused by the
/// chosen operation are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub operation: OperationKind,
    #[serde(default)]
    pub colnames: Vec<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub colname1: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub colname2: String,
    #[serde(default = "default_unit")]
    pub unit: Unit,
    #[serde(default = "default_roundunit")]
    pub roundunit: Unit,
    #[serde(default, deserialize_with = "nullable_string")]
    pub outcolname: String,
}

fn default_unit() -> Unit {
    Unit::Day
}

fn default_roundunit() -> Unit {
    Unit::Hour
}

fn nullable_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// Upgrade stored params to the current version.
///
/// v0 had no `roundunit`; v1 adds it, defaulting to `"hour"`.
pub fn migrate_params(params: Value) -> Value {
    match params {
        Value::Object(mut map) if !map.contains_key("roundunit") => {
            map.insert("roundunit".to_string(), Value::from(Unit::Hour.name()));
            Value::Object(map)
        }
        other => other,
    }
}

impl Params {
    /// Migrate, then parse.
    pub fn from_json(params: Value) -> Result<Params> {
        serde_json::from_value(migrate_params(params))
            .map_err(|e| TsMathError::invalid_params(e.to_string()))
    }

    pub fn request(&self) -> Request<'_> {
        match self.operation {
            OperationKind::Minimum => Request::Minimum {
                colnames: &self.colnames,
                outcolname: &self.outcolname,
            },
            OperationKind::Maximum => Request::Maximum {
                colnames: &self.colnames,
                outcolname: &self.outcolname,
            },
            OperationKind::Difference => Request::Difference {
                colname1: &self.colname1,
                colname2: &self.colname2,
                unit: self.unit,
                outcolname: &self.outcolname,
            },
            OperationKind::StartOf => Request::StartOf {
                colnames: &self.colnames,
                unit: self.roundunit,
            },
        }
    }
}

/// One invocation, carrying only the inputs its operation reads.
/// Empty names mean "not chosen yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    Minimum {
        colnames: &'a [String],
        outcolname: &'a str,
    },
    Maximum {
        colnames: &'a [String],
        outcolname: &'a str,
    },
    Difference {
        colname1: &'a str,
        colname2: &'a str,
        unit: Unit,
        outcolname: &'a str,
    },
    StartOf {
        colnames: &'a [String],
        unit: Unit,
    },
}

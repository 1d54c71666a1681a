use crate::error::{self, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fmt::Debug;

/// The `Configuration` trait is for plain-data input types, such as a `ClusterSpec`, that are
/// supplied by operators as loosely typed YAML or JSON documents.
///
/// The traits aggregated by the `Configuration` trait are typical of "plain old data" types and
/// give callers a way to move between the strongly typed struct and an unconstrained serde
/// `Map`, e.g. to layer command line overrides onto a file before validating it.
///
pub trait Configuration:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + Sized + 'static
{
    /// Convert the `Configuration` object to a serde `Map`.
    fn into_map(self) -> Result<Map<String, Value>> {
        match self.into_value()? {
            Value::Object(map) => Ok(map),
            _ => error::ConfigWrongValueTypeSnafu {}.fail(),
        }
    }

    /// Convert the `Configuration` object to a serde `Value`.
    fn into_value(self) -> Result<Value> {
        serde_json::to_value(self).context(error::ConfigSerializationSnafu)
    }

    /// Deserialize the `Configuration` object from a serde `Map`.
    fn from_map(map: Map<String, Value>) -> Result<Self> {
        Self::from_value(Value::Object(map))
    }

    /// Deserialize the `Configuration` object from a serde `Value`.
    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).context(error::ConfigDeserializationSnafu)
    }
}

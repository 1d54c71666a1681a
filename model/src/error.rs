use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Error deserializing configuration: {}", source))]
    ConfigDeserialization { source: serde_json::Error },

    #[snafu(display("Error serializing configuration: {}", source))]
    ConfigSerialization { source: serde_json::Error },

    #[snafu(display(
        "Error serializing configuration: expected Value::Object type but got something else."
    ))]
    ConfigWrongValueType {},

    #[snafu(display("Invalid topology for cluster '{}': {}", cluster, reason))]
    InvalidTopology { cluster: String, reason: String },

    #[snafu(display("Unable to serialize {} as json: {}", what, source))]
    JsonSerialization {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to deserialize {} from yaml: {}", what, source))]
    YamlDeserialization {
        what: String,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to serialize {} as yaml: {}", what, source))]
    YamlSerialization {
        what: String,
        source: serde_yaml::Error,
    },
}

impl Error {
    /// Whether this error was raised because the requested topology cannot be built. No plan is
    /// ever emitted alongside such an error.
    pub fn is_invalid_topology(&self) -> bool {
        matches!(self, Error::InvalidTopology { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

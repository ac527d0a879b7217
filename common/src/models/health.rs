//! Health check request and response models.
//!
//! The request carries connection parameters for every backend; the response
//! carries one human-readable liveness string per backend.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backends probed by the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    PostgreSQL,
    MySQL,
    MongoDB,
    Redis,
}

impl Backend {
    /// All backends, in response field order.
    pub const ALL: [Backend; 4] = [
        Backend::PostgreSQL,
        Backend::MySQL,
        Backend::MongoDB,
        Backend::Redis,
    ];

    /// Display name used in diagnostic strings.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::PostgreSQL => "PostgreSQL",
            Backend::MySQL => "MySQL",
            Backend::MongoDB => "MongoDB",
            Backend::Redis => "Redis",
        }
    }

    /// String reported when the backend answered its liveness probe.
    pub fn alive_message(&self) -> String {
        format!("{} is alive", self.name())
    }

    pub fn connect_failure_prefix(&self) -> String {
        format!("Failed to connect to {}: ", self.name())
    }

    pub fn ping_failure_prefix(&self) -> String {
        format!("Failed to ping {}: ", self.name())
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// PostgreSQL connection parameters.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostgresParams {
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dbname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sslmode: String,
}

/// MySQL connection parameters.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct MySqlParams {
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dbname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: String,
}

/// MongoDB connection parameters.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct MongoParams {
    /// Full connection URI, handed to the driver unchanged.
    #[serde(deserialize_with = "null_as_default")]
    pub uri: String,
}

/// Redis connection parameters.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedisParams {
    /// `host:port`.
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    /// Logical database index.
    #[serde(deserialize_with = "null_as_default")]
    pub db: i64,
}

/// Request body for `POST /health`.
///
/// Missing or `null` sub-bundles and fields decode to zero values.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealthCheckRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub postgresql: PostgresParams,
    #[serde(deserialize_with = "null_as_default")]
    pub mysql: MySqlParams,
    #[serde(deserialize_with = "null_as_default")]
    pub mongodb: MongoParams,
    #[serde(deserialize_with = "null_as_default")]
    pub redis: RedisParams,
}

impl HealthCheckRequest {
    /// Decodes the first JSON value in `body`; trailing bytes are ignored.
    ///
    /// The top-level value must be an object.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
        let value = match stream.next() {
            Some(value) => value?,
            // Empty input: let the parser produce its own EOF error.
            None => serde_json::from_slice::<Value>(body)?,
        };
        if !value.is_object() {
            return Err(de::Error::invalid_type(unexpected(&value), &"a JSON object"));
        }
        Self::deserialize(value)
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

// Passwords and URIs must never reach the logs.
macro_rules! redacted_debug {
    ($ty:ty, $name:literal) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!($name, " { .. }"))
            }
        }
    };
}

redacted_debug!(PostgresParams, "PostgresParams");
redacted_debug!(MySqlParams, "MySqlParams");
redacted_debug!(MongoParams, "MongoParams");
redacted_debug!(RedisParams, "RedisParams");
redacted_debug!(HealthCheckRequest, "HealthCheckRequest");

/// Response body for `POST /health`. Fields serialize in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckResponse {
    pub postgresql: String,
    pub mysql: String,
    pub mongodb: String,
    pub redis: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

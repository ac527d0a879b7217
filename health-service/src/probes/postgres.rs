//! PostgreSQL probe adapter.

use std::time::Duration;

use async_trait::async_trait;
use common::models::{Backend, PostgresParams};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};

use super::sql::LazySqlClient;
use super::{ProbeAdapter, ProbeError, ProbeResult};

/// Probes a PostgreSQL server described by a keyword/value DSN.
pub struct PostgresProbe {
    dsn: String,
    connect_timeout: Duration,
}

impl PostgresProbe {
    pub fn new(params: &PostgresParams, connect_timeout: Duration) -> Self {
        Self {
            dsn: build_dsn(params),
            connect_timeout,
        }
    }
}

#[async_trait]
impl ProbeAdapter for PostgresProbe {
    type Client = LazySqlClient<PgConnection>;

    fn backend(&self) -> Backend {
        Backend::PostgreSQL
    }

    async fn connect(&self) -> ProbeResult<Self::Client> {
        let options = parse_dsn(&self.dsn)?;
        Ok(LazySqlClient::new(options, self.connect_timeout))
    }

    async fn ping(&self, client: &mut Self::Client) -> ProbeResult<()> {
        client.ping().await
    }

    async fn release(&self, client: Self::Client) -> ProbeResult<()> {
        client.close().await
    }
}

/// Builds `user=.. password=.. dbname=.. host=.. port=.. sslmode=..`.
///
/// Values are not quoted.
pub fn build_dsn(params: &PostgresParams) -> String {
    format!(
        "user={} password={} dbname={} host={} port={} sslmode={}",
        params.user, params.password, params.dbname, params.host, params.port, params.sslmode
    )
}

/// Parses a keyword/value DSN into connect options.
///
/// Empty values keep the driver defaults, except `sslmode`, which falls back
/// to `require`.
pub fn parse_dsn(dsn: &str) -> ProbeResult<PgConnectOptions> {
    let mut options = PgConnectOptions::new_without_pgpass().ssl_mode(PgSslMode::Require);

    for token in dsn.split_whitespace() {
        let (key, value) = token.split_once('=').ok_or_else(|| {
            ProbeError::InvalidDsn(format!(
                "missing \"=\" after {:?} in connection info string",
                token
            ))
        })?;
        if value.is_empty() {
            continue;
        }

        options = match key {
            "user" => options.username(value),
            "password" => options.password(value),
            "dbname" => options.database(value),
            "host" => options.host(value),
            "port" => {
                let port = value
                    .parse::<u16>()
                    .map_err(|e| ProbeError::InvalidDsn(format!("invalid port {:?}: {}", value, e)))?;
                options.port(port)
            }
            "sslmode" => {
                let mode = value
                    .parse::<PgSslMode>()
                    .map_err(|e| ProbeError::InvalidDsn(e.to_string()))?;
                options.ssl_mode(mode)
            }
            other => {
                return Err(ProbeError::InvalidDsn(format!(
                    "unrecognized connection parameter {:?}",
                    other
                )))
            }
        };
    }

    Ok(options)
}

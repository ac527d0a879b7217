//! MySQL probe adapter.

use std::time::Duration;

use async_trait::async_trait;
use common::models::{Backend, MySqlParams};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};

use super::sql::LazySqlClient;
use super::{ProbeAdapter, ProbeError, ProbeResult};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;

/// Probes a MySQL server described by a `user:password@tcp(host:port)/dbname` DSN.
pub struct MySqlProbe {
    dsn: String,
    connect_timeout: Duration,
}

impl MySqlProbe {
    pub fn new(params: &MySqlParams, connect_timeout: Duration) -> Self {
        Self {
            dsn: build_dsn(params),
            connect_timeout,
        }
    }
}

#[async_trait]
impl ProbeAdapter for MySqlProbe {
    type Client = LazySqlClient<MySqlConnection>;

    fn backend(&self) -> Backend {
        Backend::MySQL
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

pub fn build_dsn(params: &MySqlParams) -> String {
    format!(
        "{}:{}@tcp({}:{})/{}",
        params.user, params.password, params.host, params.port, params.dbname
    )
}

/// Components of a `user:password@tcp(host:port)/dbname` DSN, taken verbatim.
#[derive(Debug, PartialEq, Eq)]
struct DsnParts<'a> {
    user: &'a str,
    password: &'a str,
    host: &'a str,
    port: u16,
    dbname: &'a str,
}

/// Splits a driver-style DSN.
///
/// The database name follows the last `/` and the credentials precede the
/// last `@`, so passwords may contain `@`, `:` and `%` as-is. An empty host
/// means the local host, an empty port means 3306.
fn split_dsn(dsn: &str) -> ProbeResult<DsnParts<'_>> {
    let (prefix, dbname) = dsn.rsplit_once('/').ok_or_else(|| {
        ProbeError::InvalidDsn("missing the slash separating the database name".into())
    })?;
    let dbname = dbname.split_once('?').map_or(dbname, |(db, _)| db);

    let (userinfo, address) = prefix.rsplit_once('@').unwrap_or(("", prefix));
    let (user, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));

    let addr = if address.is_empty() {
        ""
    } else {
        address
            .strip_prefix("tcp(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| {
                ProbeError::InvalidDsn(format!("unsupported network address {:?}", address))
            })?
    };
    let (host, port) = split_host_port(addr)?;

    Ok(DsnParts {
        user,
        password,
        host,
        port,
        dbname,
    })
}

fn split_host_port(addr: &str) -> ProbeResult<(&str, u16)> {
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => (addr, ""),
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() { DEFAULT_HOST } else { host };

    if port.is_empty() {
        return Ok((host, DEFAULT_PORT));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| ProbeError::InvalidDsn(format!("invalid port {:?}: {}", port, e)))?;
    Ok((host, port))
}

/// Parses a driver-style DSN into connect options.
pub fn parse_dsn(dsn: &str) -> ProbeResult<MySqlConnectOptions> {
    let parts = split_dsn(dsn)?;

    let mut options = MySqlConnectOptions::new()
        .host(parts.host)
        .port(parts.port)
        .username(parts.user);
    if !parts.password.is_empty() {
        options = options.password(parts.password);
    }
    if !parts.dbname.is_empty() {
        options = options.database(parts.dbname);
    }

    Ok(options)
}

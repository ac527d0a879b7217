//! Lazily connected SQL client shared by the PostgreSQL and MySQL adapters.

use std::time::Duration;

use sqlx::Connection;

use super::{with_connect_timeout, ProbeResult};

/// A SQL client that opens its connection on first use.
///
/// Construction only validates options; the network is touched by
/// [`LazySqlClient::ping`].
pub struct LazySqlClient<C: Connection> {
    options: C::Options,
    conn: Option<C>,
    connect_timeout: Duration,
}

impl<C: Connection> LazySqlClient<C> {
    pub fn new(options: C::Options, connect_timeout: Duration) -> Self {
        Self {
            options,
            conn: None,
            connect_timeout,
        }
    }

    /// Opens the connection if needed and runs a protocol ping.
    pub async fn ping(&mut self) -> ProbeResult<()> {
        if self.conn.is_none() {
            let conn =
                with_connect_timeout(self.connect_timeout, C::connect_with(&self.options)).await?;
            self.conn = Some(conn);
        }
        if let Some(conn) = self.conn.as_mut() {
            conn.ping().await?;
        }
        Ok(())
    }

    /// Gracefully closes the connection, if one was opened.
    pub async fn close(self) -> ProbeResult<()> {
        if let Some(conn) = self.conn {
            conn.close().await?;
        }
        Ok(())
    }
}

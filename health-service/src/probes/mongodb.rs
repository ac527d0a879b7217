//! MongoDB probe adapter.

use async_trait::async_trait;
use common::models::{Backend, MongoParams};
use mongodb::{bson::doc, options::ClientOptions, Client};

use super::{ProbeAdapter, ProbeResult};

/// Probes a MongoDB deployment from a full connection URI.
///
/// Client construction does not contact the server; the `ping` command does.
pub struct MongoProbe {
    uri: String,
}

impl MongoProbe {
    pub fn new(params: &MongoParams) -> Self {
        Self {
            uri: params.uri.clone(),
        }
    }
}

#[async_trait]
impl ProbeAdapter for MongoProbe {
    type Client = Client;

    fn backend(&self) -> Backend {
        Backend::MongoDB
    }

    async fn connect(&self) -> ProbeResult<Client> {
        let options = ClientOptions::parse(self.uri.as_str()).await?;
        Ok(Client::with_options(options)?)
    }

    async fn ping(&self, client: &mut Client) -> ProbeResult<()> {
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn release(&self, client: Client) -> ProbeResult<()> {
        client.shutdown().await;
        Ok(())
    }
}

use {
    super::http::{self, roundtrip},
    model::{DeploymentRecord, StoredDeployment},
    reqwest::Url,
};

/// Records deployments in the operator's history.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Persistence: Send + Sync {
    async fn store(&self, record: &DeploymentRecord) -> Result<StoredDeployment, http::Error>;

    /// Recorded deployments, newest first.
    async fn list(&self) -> Result<Vec<StoredDeployment>, http::Error>;
}

/// The deployment history API.
pub struct Api {
    client: reqwest::Client,
    endpoint: Url,
}

impl Api {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait::async_trait]
impl Persistence for Api {
    async fn store(&self, record: &DeploymentRecord) -> Result<StoredDeployment, http::Error> {
        let stored: StoredDeployment =
            roundtrip!(<StoredDeployment>; self.client.post(self.endpoint.clone()).json(record))
                .await?;
        tracing::debug!(id = ?stored.id, status = %stored.record.status, "stored deployment");
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredDeployment>, http::Error> {
        let deployments: Vec<StoredDeployment> =
            roundtrip!(<Vec<StoredDeployment>>; self.client.get(self.endpoint.clone())).await?;
        tracing::debug!(count = deployments.len(), "listed deployments");
        Ok(deployments)
    }
}

/// Used when no history API is configured. Records are only logged.
pub struct Discard;

#[async_trait::async_trait]
impl Persistence for Discard {
    async fn store(&self, record: &DeploymentRecord) -> Result<StoredDeployment, http::Error> {
        tracing::info!(?record, "no persistence configured, deployment not recorded");
        Ok(StoredDeployment {
            id: None,
            created_at: None,
            record: record.clone(),
        })
    }

    async fn list(&self) -> Result<Vec<StoredDeployment>, http::Error> {
        tracing::info!("no persistence configured, no deployments recorded");
        Ok(Vec::new())
    }
}

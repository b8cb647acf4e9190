//! Implements the ChangelogStore trait over the store's REST API
use async_trait::async_trait;
use log::*;
use reqwest::{Client, Request, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    config::with_trailing_slash,
    error::{ChangelogError, Result},
    store::{
        traits::ChangelogStore,
        types::{ChangelogRecord, ChangelogUpdate, ListQuery, NewChangelog},
    },
};

/// Store location used when none is configured.
pub const DEFAULT_STORE_URL: &str = "http://localhost:8000";

/// Every store request is bounded by this timeout unless overridden.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

const COLLECTION_PATH: &str = "api/changelogs";

/// REST client for the changelog store.
pub struct HttpChangelogStore {
    client: Client,
    base_url: Url,
}

impl HttpChangelogStore {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> Result<Url> {
        Ok(self.base_url.join(COLLECTION_PATH)?)
    }

    fn item_url(&self, id: u64) -> Result<Url> {
        Ok(self.base_url.join(&format!("{COLLECTION_PATH}/{id}"))?)
    }

    async fn send(&self, request: Request) -> Result<Response> {
        debug!("{} {}", request.method(), request.url());

        self.client
            .execute(request)
            .await
            .map_err(|err| ChangelogError::from_transport(err, &self.base_url))
    }

    /// Read the body of a response, turning error statuses into
    /// `BackendRejected` with the server's body.
    async fn read_body(&self, response: Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| {
                ChangelogError::from_transport(err, &self.base_url)
            })?;

        if !status.is_success() {
            return Err(ChangelogError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T> {
        let body = self.read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChangelogStore for HttpChangelogStore {
    async fn create(&self, changelog: NewChangelog) -> Result<ChangelogRecord> {
        let url = self.collection_url()?;
        let request = self.client.post(url).json(&changelog).build()?;
        let response = self.send(request).await?;
        let record: ChangelogRecord = self.read_json(response).await?;

        info!(
            "published changelog {} ({}) for {}",
            record.id, record.version, record.project_name
        );

        Ok(record)
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<ChangelogRecord>> {
        let mut url = self.collection_url()?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("skip", &query.skip.to_string());
            if let Some(project) = &query.project {
                pairs.append_pair("project", project);
            }
        }

        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;

        self.read_json(response).await
    }

    async fn get(&self, id: u64) -> Result<Option<ChangelogRecord>> {
        let request = self.client.get(self.item_url(id)?).build()?;
        let response = self.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(self.read_json(response).await?))
    }

    async fn update(
        &self,
        id: u64,
        update: ChangelogUpdate,
    ) -> Result<ChangelogRecord> {
        let request =
            self.client.put(self.item_url(id)?).json(&update).build()?;
        let response = self.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChangelogError::NotFound(id));
        }

        self.read_json(response).await
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let request = self.client.delete(self.item_url(id)?).build()?;
        let response = self.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChangelogError::NotFound(id));
        }

        self.read_body(response).await?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "./http_tests.rs"]
mod tests;

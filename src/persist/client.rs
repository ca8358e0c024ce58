use std::sync::Arc;

use anyhow::Context;
use reqwest::{Client, Response};
use tracing::{debug, info};
use url::Url;

use crate::foundation::error::{MemeError, MemeResult};
use crate::persist::credentials::CredentialProvider;
use crate::persist::record::{CompositionRecord, NewComposition};

const CREATE_PATH: &str = "api/memes";
const LIST_MINE_PATH: &str = "api/memes/my";

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the composition store.
///
/// Every call needs a bearer credential; without one it fails with
/// [`MemeError::NotAuthenticated`] before any request is made.
#[derive(Clone)]
pub struct PersistenceClient {
    http: Client,
    base: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl PersistenceClient {
    /// Client rooted at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> MemeResult<Self> {
        Self::with_http_client(Client::new(), base_url, credentials)
    }

    /// Same as [`new`](Self::new) with a preconfigured HTTP client.
    pub fn with_http_client(
        http: Client,
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> MemeResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| MemeError::validation(format!("invalid api base url '{base_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    /// Base URL all paths are joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `true` when a credential is currently available.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.bearer_token().is_some()
    }

    /// Persist a composition and return the stored record.
    #[tracing::instrument(skip_all, fields(template = %draft.template_name))]
    pub async fn create(&self, draft: &NewComposition) -> MemeResult<CompositionRecord> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(MemeError::NotAuthenticated)?;
        let url = self.endpoint(CREATE_PATH)?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(draft)
            .send()
            .await
            .map_err(|e| MemeError::save(e.to_string()))?;
        let resp = check_status(resp).await.map_err(MemeError::save)?;
        let record: CompositionRecord = resp
            .json()
            .await
            .map_err(|e| MemeError::save(format!("unreadable response: {e}")))?;
        info!(id = %record.id, "composition saved");
        Ok(record)
    }

    /// Compositions owned by the current user.
    #[tracing::instrument(skip_all)]
    pub async fn list_mine(&self) -> MemeResult<Vec<CompositionRecord>> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(MemeError::NotAuthenticated)?;
        let url = self.endpoint(LIST_MINE_PATH)?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("list compositions")?;
        let resp = check_status(resp)
            .await
            .map_err(|msg| anyhow::anyhow!("list compositions: {msg}"))?;
        let records: Vec<CompositionRecord> = resp
            .json()
            .await
            .context("decode composition list")?;
        debug!(count = records.len(), "listed compositions");
        Ok(records)
    }

    fn endpoint(&self, path: &str) -> MemeResult<Url> {
        self.base
            .join(path)
            .map_err(|e| MemeError::validation(format!("build endpoint '{path}': {e}")))
    }
}

/// Pass 2xx responses through; otherwise prefer the backend's `message` over the bare status.
async fn check_status(resp: Response) -> Result<Response, String> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    Err(message.unwrap_or_else(|| format!("HTTP {status}")))
}

#[cfg(test)]
#[path = "../../tests/unit/persist/client.rs"]
mod tests;

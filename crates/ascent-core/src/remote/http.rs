//! HTTP client for the remote progress and life-context endpoints.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET  users/{id}/progress`      -> `[{moduleId, completedUnits}]`
//! - `POST users/{id}/progress`      <- `{moduleId, unitIndex}`
//! - `GET  users/{id}/life-context`  -> `LifeContext` (404 = none on record)
//!
//! The client owns a current-thread runtime so the synchronous service
//! traits can be called from plain (non-async) code.

use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::{LifeContextSource, ModuleProgress, RemoteProgressService, UserId};
use crate::error::{ConfigError, CoreError, RemoteError};
use crate::life_context::LifeContext;

pub struct HttpProgressService {
    base: Url,
    token: Option<String>,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpProgressService {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or cannot carry a path,
    /// or if the HTTP client or runtime cannot be created.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, CoreError> {
        let base = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            key: "remote.base_url".into(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                key: "remote.base_url".into(),
                message: format!("'{base_url}' cannot carry a path"),
            }
            .into());
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::from)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            base,
            token,
            client,
            runtime,
        })
    }

    fn endpoint(&self, user: &UserId, tail: &str) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new(), so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["users", user.as_str(), tail]);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn ensure_success(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

impl RemoteProgressService for HttpProgressService {
    fn get_user_progress(&self, user: &UserId) -> Result<Vec<ModuleProgress>, RemoteError> {
        let url = self.endpoint(user, "progress");
        tracing::debug!(%url, "fetching remote progress");
        self.runtime.block_on(async {
            let resp = self.authorize(self.client.get(url)).send().await?;
            ensure_success(resp)
                .await?
                .json::<Vec<ModuleProgress>>()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()))
        })
    }

    fn save_progress(
        &self,
        user: &UserId,
        module_id: &str,
        unit_index: u32,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(user, "progress");
        let body = json!({ "moduleId": module_id, "unitIndex": unit_index });
        self.runtime.block_on(async {
            let resp = self
                .authorize(self.client.post(url))
                .json(&body)
                .send()
                .await?;
            ensure_success(resp).await.map(|_| ())
        })
    }
}

impl LifeContextSource for HttpProgressService {
    fn life_context(&self, user: &UserId) -> Result<Option<LifeContext>, RemoteError> {
        let url = self.endpoint(user, "life-context");
        self.runtime.block_on(async {
            let resp = self.authorize(self.client.get(url)).send().await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            ensure_success(resp)
                .await?
                .json::<LifeContext>()
                .await
                .map(Some)
                .map_err(|e| RemoteError::Decode(e.to_string()))
        })
    }
}

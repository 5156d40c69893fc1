//! HTTP client for the InitFlow API.
//!
//! Password login, then bearer-token authenticated JSON endpoints for listing
//! workspaces and for uploading and fetching wrapped workspace keys. Envelope
//! bytes travel as standard base64 inside `{ "wrapped_key": ... }`.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::CloudConfig;
use crate::error::{CloudError, CloudResult};
use crate::types::{LoginRequest, LoginResponse, Workspace, WorkspaceList, WrappedKeyPayload};

/// HTTP client for the InitFlow control plane.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: CloudConfig,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: CloudConfig) -> CloudResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Sets the bearer token (restored from the caller's own storage).
    pub async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn get_token(&self) -> CloudResult<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(CloudError::AuthRequired)
    }

    fn endpoint(&self, segments: &[&str]) -> CloudResult<Url> {
        let mut url = Url::parse(self.config.base_url())
            .map_err(|e| CloudError::Config(format!("invalid api_base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CloudError::Config("api_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn auth_get(&self, url: Url) -> CloudResult<Response> {
        let token = self.get_token().await?;
        debug!("GET {}", url.path());
        Ok(self.client.get(url).bearer_auth(&token).send().await?)
    }

    async fn auth_post(&self, url: Url, body: &impl Serialize) -> CloudResult<Response> {
        let token = self.get_token().await?;
        debug!("POST {}", url.path());
        Ok(self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?)
    }

    // ── Auth ──

    /// Exchanges email and password for a bearer token, which is kept for the
    /// calls that follow.
    pub async fn login(&self, email: &str, password: &str) -> CloudResult<LoginResponse> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CloudError::InvalidInput("email cannot be empty".to_string()));
        }
        if password.trim().is_empty() {
            return Err(CloudError::InvalidInput("password cannot be empty".to_string()));
        }

        let url = self.endpoint(&["api", "auth", "login"])?;
        debug!("POST {}", url.path());
        let resp = self
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let login: LoginResponse = check_status(resp, "login")?.json().await?;

        self.set_token(login.token.clone()).await;
        info!("login succeeded");
        Ok(login)
    }

    // ── Workspaces ──

    pub async fn list_workspaces(&self) -> CloudResult<Vec<Workspace>> {
        let url = self.endpoint(&["api", "workspaces"])?;
        let resp = check_status(self.auth_get(url).await?, "workspaces")?;
        let data: WorkspaceList = resp.json().await?;
        Ok(data.workspaces)
    }

    pub async fn get_workspace_by_slug(&self, slug: &str) -> CloudResult<Workspace> {
        let url = self.endpoint(&["api", "workspaces", slug])?;
        let resp = check_status(self.auth_get(url).await?, &format!("workspace {slug}"))?;
        Ok(resp.json().await?)
    }

    // ── Wrapped Keys ──

    /// Uploads a wrapped workspace key. A 409 means another device already
    /// initialized the workspace.
    pub async fn upload_wrapped_key(&self, workspace_id: &str, envelope: &[u8]) -> CloudResult<()> {
        let url = self.endpoint(&["api", "workspaces", workspace_id, "key"])?;
        let body = WrappedKeyPayload {
            wrapped_key: STANDARD.encode(envelope),
        };
        check_status(
            self.auth_post(url, &body).await?,
            &format!("wrapped key for workspace {workspace_id}"),
        )?;
        Ok(())
    }

    /// Fetches the wrapped key addressed to this device.
    pub async fn fetch_wrapped_key(&self, workspace_id: &str) -> CloudResult<Vec<u8>> {
        let url = self.endpoint(&["api", "workspaces", workspace_id, "key"])?;
        let resp = check_status(
            self.auth_get(url).await?,
            &format!("wrapped key for workspace {workspace_id}"),
        )?;
        let payload: WrappedKeyPayload = resp.json().await?;
        STANDARD
            .decode(payload.wrapped_key.as_bytes())
            .map_err(|e| CloudError::Api(format!("invalid wrapped key encoding: {e}")))
    }
}

/// Maps the statuses the workspace-key flow distinguishes; everything else
/// non-2xx becomes [`CloudError::Api`].
fn check_status(resp: Response, what: &str) -> CloudResult<Response> {
    match resp.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CloudError::AuthFailed(format!(
            "{} on {}",
            resp.status(),
            resp.url().path()
        ))),
        StatusCode::NOT_FOUND => Err(CloudError::NotFound(what.to_string())),
        StatusCode::CONFLICT => Err(CloudError::Conflict(format!("{what} already exists"))),
        _ => resp
            .error_for_status()
            .map_err(|e| CloudError::Api(e.to_string())),
    }
}

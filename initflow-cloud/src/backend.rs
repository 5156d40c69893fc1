//! Backend seam for the workspace key flow.

use async_trait::async_trait;

use crate::api_client::ApiClient;
use crate::error::CloudResult;
use crate::types::Workspace;

/// Remote relay that stores wrapped workspace keys.
///
/// Envelope bytes are opaque here: the flat `ephemeral_pk || nonce ||
/// ciphertext+tag` layout produced by `initflow_crypto`.
#[async_trait]
pub trait WorkspaceBackend: Send + Sync {
    async fn list_workspaces(&self) -> CloudResult<Vec<Workspace>>;

    async fn get_workspace_by_slug(&self, slug: &str) -> CloudResult<Workspace>;

    /// Stores the wrapped key. Returns `CloudError::Conflict` if the backend
    /// already holds one for this workspace.
    async fn upload_wrapped_key(&self, workspace_id: &str, envelope: &[u8]) -> CloudResult<()>;

    async fn fetch_wrapped_key(&self, workspace_id: &str) -> CloudResult<Vec<u8>>;
}

#[async_trait]
impl WorkspaceBackend for ApiClient {
    async fn list_workspaces(&self) -> CloudResult<Vec<Workspace>> {
        ApiClient::list_workspaces(self).await
    }

    async fn get_workspace_by_slug(&self, slug: &str) -> CloudResult<Workspace> {
        ApiClient::get_workspace_by_slug(self, slug).await
    }

    async fn upload_wrapped_key(&self, workspace_id: &str, envelope: &[u8]) -> CloudResult<()> {
        ApiClient::upload_wrapped_key(self, workspace_id, envelope).await
    }

    async fn fetch_wrapped_key(&self, workspace_id: &str) -> CloudResult<Vec<u8>> {
        ApiClient::fetch_wrapped_key(self, workspace_id).await
    }
}

//! Workspace key initialization and recovery.
//!
//! Ties key generation, envelope sealing, the backend and the local key store
//! together. Per (workspace, device) the flow moves through
//!
//! ```text
//! Uninitialized -> Sealing -> Uploading -> Storing -> Ready
//! ```
//!
//! Failures before the upload lands are safe to retry from scratch. A failure
//! while storing is reported as [`CloudError::UploadedButNotStoredLocally`] and
//! must be repaired with [`WorkspaceKeyService::recover_local_key`], never by
//! sealing a new key.
//!
//! The backend's `key_initialized` flag decides which device's key becomes
//! canonical. It is an idempotency check only; confidentiality rests on the
//! envelope, which only the matching private key can open.

use std::fmt;
use std::sync::Arc;

use initflow_crypto::{
    CryptoError, DeviceKeyPair, PublicKey, Rng, WorkspaceKey, WrappedEnvelope,
    generate_workspace_key, open_workspace_key, seal_workspace_key,
};
use tracing::{debug, info, warn};

use crate::backend::WorkspaceBackend;
use crate::error::{CloudError, CloudResult};
use crate::key_store::LocalKeyStore;
use crate::types::Workspace;

/// Position in the initialization state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitStage {
    Uninitialized,
    Sealing,
    Uploading,
    /// Failures here surface as [`CloudError::UploadedButNotStoredLocally`].
    Storing,
    Ready,
}

impl InitStage {
    /// True if a failure at this stage left nothing on the backend, so the
    /// whole flow can simply be run again.
    pub fn is_retryable_from_scratch(&self) -> bool {
        matches!(
            self,
            InitStage::Uninitialized | InitStage::Sealing | InitStage::Uploading
        )
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::Uninitialized => "uninitialized",
            InitStage::Sealing => "sealing",
            InitStage::Uploading => "uploading",
            InitStage::Storing => "storing",
            InitStage::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Successful result of [`WorkspaceKeyService::initialize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new key was generated, uploaded and stored.
    Initialized,
    /// This device already holds the workspace key; nothing was done.
    AlreadyInitializedLocally,
    /// Another device already initialized the workspace; nothing was done.
    /// Obtain the key through an envelope addressed to this device.
    AlreadyInitializedRemotely,
}

/// Orchestrates workspace key initialization for one device.
pub struct WorkspaceKeyService {
    backend: Arc<dyn WorkspaceBackend>,
    store: Arc<dyn LocalKeyStore>,
    rng: Arc<Rng>,
}

impl WorkspaceKeyService {
    pub fn new(
        backend: Arc<dyn WorkspaceBackend>,
        store: Arc<dyn LocalKeyStore>,
        rng: Arc<Rng>,
    ) -> Self {
        Self {
            backend,
            store,
            rng,
        }
    }

    pub async fn list_workspaces(&self) -> CloudResult<Vec<Workspace>> {
        self.backend.list_workspaces().await
    }

    /// Creates the canonical key for `slug`, seals it to `device`'s own public
    /// key, uploads the envelope and stores the plaintext key locally.
    pub async fn initialize(&self, slug: &str, device: &DeviceKeyPair) -> CloudResult<InitOutcome> {
        info!(workspace = slug, "initializing workspace key");

        if self.store.has_workspace_key(slug).await {
            info!(workspace = slug, "workspace key already stored locally");
            return Ok(InitOutcome::AlreadyInitializedLocally);
        }

        let workspace = self
            .backend
            .get_workspace_by_slug(slug)
            .await
            .map_err(|e| CloudError::at(InitStage::Uninitialized, e))?;

        if workspace.key_initialized {
            info!(workspace = slug, "workspace key already initialized on backend");
            return Ok(InitOutcome::AlreadyInitializedRemotely);
        }

        debug!(workspace = slug, stage = %InitStage::Sealing, "generating workspace key");
        let (key, envelope) = self
            .seal_fresh_key(device)
            .map_err(|e| CloudError::at(InitStage::Sealing, e))?;

        debug!(
            workspace = slug,
            stage = %InitStage::Uploading,
            bytes = envelope.len(),
            "uploading wrapped key"
        );
        match self.backend.upload_wrapped_key(&workspace.id, &envelope).await {
            Ok(()) => {}
            Err(CloudError::Conflict(reason)) => {
                warn!(
                    workspace = slug,
                    %reason,
                    "another device initialized the workspace first"
                );
                return Ok(InitOutcome::AlreadyInitializedRemotely);
            }
            Err(e) => return Err(CloudError::at(InitStage::Uploading, e)),
        }

        debug!(workspace = slug, stage = %InitStage::Storing, "storing workspace key locally");
        if let Err(e) = self.store.store_workspace_key(slug, &key).await {
            warn!(workspace = slug, error = %e, "wrapped key uploaded but local store failed");
            return Err(CloudError::UploadedButNotStoredLocally {
                slug: slug.to_string(),
                reason: e.to_string(),
            });
        }

        info!(workspace = slug, stage = %InitStage::Ready, "workspace key initialized");
        Ok(InitOutcome::Initialized)
    }

    /// Same as [`initialize`](Self::initialize), reading the device identity
    /// from the local store.
    pub async fn initialize_with_stored_identity(&self, slug: &str) -> CloudResult<InitOutcome> {
        if !self.store.has_own_key_pair().await {
            return Err(CloudError::DeviceNotRegistered);
        }
        let secret = self.store.get_private_key().await?;
        let device = DeviceKeyPair::from_secret_bytes(*secret);
        self.initialize(slug, &device).await
    }

    /// Fetches this device's envelope for `slug`, opens it and stores the key
    /// locally. Repairs [`CloudError::UploadedButNotStoredLocally`].
    pub async fn recover_local_key(
        &self,
        slug: &str,
        device: &DeviceKeyPair,
    ) -> CloudResult<WorkspaceKey> {
        let workspace = self.backend.get_workspace_by_slug(slug).await?;
        let bytes = self.backend.fetch_wrapped_key(&workspace.id).await?;
        debug!(workspace = slug, bytes = bytes.len(), "fetched wrapped key");

        let envelope = WrappedEnvelope::from_bytes(&bytes)?;
        let key = open_workspace_key(&envelope, &device.secret)?;
        self.store.store_workspace_key(slug, &key).await?;

        info!(workspace = slug, "workspace key recovered from backend");
        Ok(key)
    }

    /// Seals the locally held key for `slug` to another device's public key.
    ///
    /// Only produces the envelope; deciding who may receive it is up to the
    /// caller.
    pub async fn wrap_for_recipient(
        &self,
        slug: &str,
        recipient: &PublicKey,
    ) -> CloudResult<WrappedEnvelope> {
        let key = self
            .store
            .load_workspace_key(slug)
            .await?
            .ok_or_else(|| CloudError::NotFound(format!("no local key for workspace {slug}")))?;
        Ok(seal_workspace_key(&self.rng, &key, recipient)?)
    }

    /// Generates a key, seals it to `device` and checks the envelope opens
    /// with the device's secret before anything leaves the process.
    fn seal_fresh_key(&self, device: &DeviceKeyPair) -> CloudResult<(WorkspaceKey, Vec<u8>)> {
        let key = generate_workspace_key(&self.rng)?;
        let envelope = seal_workspace_key(&self.rng, &key, &device.public)?;

        if open_workspace_key(&envelope, &device.secret)? != key {
            return Err(CryptoError::AuthenticationFailed.into());
        }
        Ok((key, envelope.to_bytes()))
    }
}

//! Local persistence seam for device identity and unwrapped workspace keys.
//!
//! The orchestration layer never persists anything itself; it hands keys to
//! a [`LocalKeyStore`]. [`MemoryKeyStore`] is a thread-safe in-memory
//! implementation for tests and for embedders that persist elsewhere.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use initflow_crypto::{DeviceKeyPair, WorkspaceKey, X25519_KEY_SIZE};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

use crate::error::{CloudError, CloudResult};

#[async_trait]
pub trait LocalKeyStore: Send + Sync {
    async fn has_own_key_pair(&self) -> bool;

    /// Returns the device's X25519 secret. `CloudError::DeviceNotRegistered`
    /// if no key pair has been provisioned.
    async fn get_private_key(&self) -> CloudResult<Zeroizing<[u8; X25519_KEY_SIZE]>>;

    async fn has_workspace_key(&self, slug: &str) -> bool;

    async fn store_workspace_key(&self, slug: &str, key: &WorkspaceKey) -> CloudResult<()>;

    async fn load_workspace_key(&self, slug: &str) -> CloudResult<Option<WorkspaceKey>>;
}

/// Thread-safe in-memory key store.
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    device_secret: Arc<RwLock<Option<Zeroizing<[u8; X25519_KEY_SIZE]>>>>,
    keys: Arc<RwLock<HashMap<String, WorkspaceKey>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a device identity.
    pub fn with_device(keypair: &DeviceKeyPair) -> Self {
        Self {
            device_secret: Arc::new(RwLock::new(Some(keypair.secret_bytes()))),
            keys: Arc::default(),
        }
    }

    /// Removes a workspace key (e.g. on workspace removal or logout).
    pub async fn remove(&self, slug: &str) -> Option<WorkspaceKey> {
        self.keys.write().await.remove(slug)
    }

    /// Returns the number of stored workspace keys.
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }
}

#[async_trait]
impl LocalKeyStore for MemoryKeyStore {
    async fn has_own_key_pair(&self) -> bool {
        self.device_secret.read().await.is_some()
    }

    async fn get_private_key(&self) -> CloudResult<Zeroizing<[u8; X25519_KEY_SIZE]>> {
        self.device_secret
            .read()
            .await
            .clone()
            .ok_or(CloudError::DeviceNotRegistered)
    }

    async fn has_workspace_key(&self, slug: &str) -> bool {
        self.keys.read().await.contains_key(slug)
    }

    async fn store_workspace_key(&self, slug: &str, key: &WorkspaceKey) -> CloudResult<()> {
        let mut keys = self.keys.write().await;
        if let Some(existing) = keys.get(slug) {
            if existing != key {
                return Err(CloudError::Storage(format!(
                    "a different key is already stored for workspace {slug}"
                )));
            }
            return Ok(());
        }
        keys.insert(slug.to_string(), key.clone());
        Ok(())
    }

    async fn load_workspace_key(&self, slug: &str) -> CloudResult<Option<WorkspaceKey>> {
        Ok(self.keys.read().await.get(slug).cloned())
    }
}

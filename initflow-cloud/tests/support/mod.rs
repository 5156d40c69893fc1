//! Shared test doubles for the workspace key flow.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use initflow_cloud::{
    CloudError, CloudResult, LocalKeyStore, MemoryKeyStore, Workspace, WorkspaceBackend,
};
use initflow_crypto::{WorkspaceKey, X25519_KEY_SIZE};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("initflow_cloud=debug"))
        .with_test_writer()
        .try_init();
}

pub fn workspace(id: &str, slug: &str, key_initialized: bool) -> Workspace {
    Workspace {
        id: id.to_string(),
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        key_initialized,
        role: "owner".to_string(),
    }
}

/// In-memory backend. The first upload per workspace wins; later uploads get
/// `Conflict`, like the real API.
#[derive(Default)]
pub struct MockBackend {
    workspaces: Mutex<HashMap<String, Workspace>>,
    wrapped: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    /// Fail uploads with a transport-style error.
    pub fail_upload: AtomicBool,
    /// Keep reporting `key_initialized: false` after an upload, as a stale
    /// read would.
    pub stale_flag: AtomicBool,
}

impl MockBackend {
    pub fn with_workspaces(workspaces: impl IntoIterator<Item = Workspace>) -> Arc<Self> {
        let map = workspaces
            .into_iter()
            .map(|ws| (ws.slug.clone(), ws))
            .collect();
        Arc::new(Self {
            workspaces: Mutex::new(map),
            ..Default::default()
        })
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn uploaded(&self, workspace_id: &str) -> Option<Vec<u8>> {
        self.wrapped.lock().await.get(workspace_id).cloned()
    }

    pub async fn upload_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.starts_with("upload:"))
            .count()
    }

    /// Plants an envelope as if another device had already uploaded it.
    pub async fn preload(&self, workspace_id: &str, envelope: Vec<u8>) {
        self.wrapped
            .lock()
            .await
            .insert(workspace_id.to_string(), envelope);
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl WorkspaceBackend for MockBackend {
    async fn list_workspaces(&self) -> CloudResult<Vec<Workspace>> {
        self.record("list".into()).await;
        let mut all: Vec<_> = self.workspaces.lock().await.values().cloned().collect();
        all.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(all)
    }

    async fn get_workspace_by_slug(&self, slug: &str) -> CloudResult<Workspace> {
        self.record(format!("get:{slug}")).await;
        self.workspaces
            .lock()
            .await
            .get(slug)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("workspace {slug}")))
    }

    async fn upload_wrapped_key(&self, workspace_id: &str, envelope: &[u8]) -> CloudResult<()> {
        self.record(format!("upload:{workspace_id}")).await;
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(CloudError::Api("connection reset".into()));
        }

        let mut wrapped = self.wrapped.lock().await;
        if wrapped.contains_key(workspace_id) {
            return Err(CloudError::Conflict(format!(
                "wrapped key for workspace {workspace_id} already exists"
            )));
        }
        wrapped.insert(workspace_id.to_string(), envelope.to_vec());

        if !self.stale_flag.load(Ordering::SeqCst) {
            for ws in self.workspaces.lock().await.values_mut() {
                if ws.id == workspace_id {
                    ws.key_initialized = true;
                }
            }
        }
        Ok(())
    }

    async fn fetch_wrapped_key(&self, workspace_id: &str) -> CloudResult<Vec<u8>> {
        self.record(format!("fetch:{workspace_id}")).await;
        self.wrapped
            .lock()
            .await
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| {
                CloudError::NotFound(format!("wrapped key for workspace {workspace_id}"))
            })
    }
}

/// Wraps a [`MemoryKeyStore`] and can be told to fail writes.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryKeyStore,
    pub fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: MemoryKeyStore) -> Self {
        Self {
            inner,
            fail_writes: Arc::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocalKeyStore for FlakyStore {
    async fn has_own_key_pair(&self) -> bool {
        self.inner.has_own_key_pair().await
    }

    async fn get_private_key(&self) -> CloudResult<Zeroizing<[u8; X25519_KEY_SIZE]>> {
        self.inner.get_private_key().await
    }

    async fn has_workspace_key(&self, slug: &str) -> bool {
        self.inner.has_workspace_key(slug).await
    }

    async fn store_workspace_key(&self, slug: &str, key: &WorkspaceKey) -> CloudResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CloudError::Storage("disk full".into()));
        }
        self.inner.store_workspace_key(slug, key).await
    }

    async fn load_workspace_key(&self, slug: &str) -> CloudResult<Option<WorkspaceKey>> {
        self.inner.load_workspace_key(slug).await
    }
}

//! Dependency-injection context shared by every tool handler.

use std::sync::Arc;

use bridge_engine::sdk::ReviewerSdk;
use bridge_engine::{DiffResolver, ReviewerClient};
use bridge_settings::BridgeConfig;
use bridge_store::Store;

/// Shared context: immutable config plus the store, SDK, and resolver.
#[derive(Clone)]
pub struct RpcContext {
    /// Immutable configuration read at startup.
    pub config: BridgeConfig,
    /// Persistent store; `None` disables session tracking entirely.
    pub store: Option<Store>,
    /// Vendor SDK handle, cheap to share across requests.
    pub sdk: Arc<dyn ReviewerSdk>,
    /// Staged-diff resolver for precommit requests.
    pub resolver: DiffResolver,
}

impl RpcContext {
    pub fn new(
        config: BridgeConfig,
        store: Option<Store>,
        sdk: Arc<dyn ReviewerSdk>,
        resolver: DiffResolver,
    ) -> Self {
        Self {
            config,
            store,
            sdk,
            resolver,
        }
    }

    /// A request-scoped reviewer client over the shared SDK handle.
    #[must_use]
    pub fn client(&self) -> ReviewerClient {
        ReviewerClient::new(Arc::clone(&self.sdk), self.config.clone())
    }
}

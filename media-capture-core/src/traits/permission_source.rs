use std::sync::Arc;

use async_trait::async_trait;

use crate::models::error::PlatformError;
use crate::models::permission::{Capability, PermissionState};
use crate::subscription::Subscription;

pub type PermissionCallback = Arc<dyn Fn(PermissionState) + Send + Sync + 'static>;

/// Platform permission reporting.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Current state of `capability`. Fails when the platform has no
    /// permission-query facility for it.
    async fn query_permission(&self, capability: Capability) -> Result<PermissionState, PlatformError>;

    /// Register for state transitions. `None` when the platform cannot
    /// report them.
    fn watch_permission(&self, capability: Capability, callback: PermissionCallback) -> Option<Subscription>;
}

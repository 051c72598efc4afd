use crate::core::routes::RouteTable;
use crate::core::session::Session;
use crate::domain::model::{DomainObject, HealthCheck, SubmitMode};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Backend-specific knowledge: which endpoints prove readiness, how object
/// types map to URLs, and how objects are encoded for each submit mode.
/// The submission engine depends only on this trait, never on a concrete
/// backend.
pub trait BackendProfile: Send + Sync {
    fn healthchecks(&self) -> Vec<HealthCheck>;

    fn routes(&self, mode: SubmitMode) -> &RouteTable;

    fn serialize(&self, obj: &DomainObject, mode: SubmitMode) -> Result<Value>;
}

/// Builds a ready-to-use network session. The credential mechanism behind it
/// (token refresh, etc.) stays external; the engine only needs the handle.
pub trait SessionFactory: Send + Sync {
    fn build(&self) -> Result<Session>;
}

/// The single-object submission seam. Chunk and batch layers depend only on
/// this, which keeps them testable without a network.
#[async_trait]
pub trait ObjectSubmitter: Send + Sync {
    /// Fail-closed route lookup: `false` means submitting this type is an
    /// error, never a default route.
    fn has_route(&self, type_tag: &str, mode: SubmitMode) -> bool;

    async fn submit_one(&self, obj: &DomainObject, mode: SubmitMode) -> Result<Value>;
}

//! Policy resolution.
//!
//! `PolicyResolver` is the seam between the core and the externally-owned
//! policy records. The in-memory store backs single-node deployments and
//! tests; `CachedPolicyResolver` is a read-through cache for resolvers
//! backed by slower storage.

use std::sync::Arc;
use std::time::Duration;

use absentia_shared::config::CacheConfig;
use absentia_shared::types::LeaveTypeId;
use dashmap::DashMap;
use moka::sync::Cache;

use super::error::PolicyError;
use super::types::LeavePolicy;

/// Read-only lookup of leave policies.
pub trait PolicyResolver: Send + Sync {
    /// Resolves the policy for a leave type.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::NotFound` if no policy is configured.
    fn resolve(&self, leave_type_id: LeaveTypeId) -> Result<LeavePolicy, PolicyError>;
}

/// In-memory policy store.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    policies: DashMap<LeaveTypeId, LeavePolicy>,
}

impl InMemoryPolicyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the policy for its leave type.
    pub fn upsert(&self, policy: LeavePolicy) {
        self.policies.insert(policy.leave_type_id, policy);
    }

    /// Removes the policy for a leave type, returning it if present.
    pub fn remove(&self, leave_type_id: LeaveTypeId) -> Option<LeavePolicy> {
        self.policies.remove(&leave_type_id).map(|(_, p)| p)
    }
}

impl PolicyResolver for InMemoryPolicyStore {
    fn resolve(&self, leave_type_id: LeaveTypeId) -> Result<LeavePolicy, PolicyError> {
        self.policies
            .get(&leave_type_id)
            .map(|p| p.clone())
            .ok_or(PolicyError::NotFound(leave_type_id))
    }
}

/// Read-through cache around another resolver.
///
/// Negative results are not cached: a missing policy is a configuration
/// error that should resolve as soon as the record appears.
pub struct CachedPolicyResolver<R> {
    inner: R,
    cache: Cache<LeaveTypeId, Arc<LeavePolicy>>,
}

impl<R: PolicyResolver> CachedPolicyResolver<R> {
    /// Creates a cache with default sizing.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, &CacheConfig::default())
    }

    /// Creates a cache sized from configuration.
    #[must_use]
    pub fn with_config(inner: R, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self { inner, cache }
    }

    /// Drops the cached entry for one leave type.
    pub fn invalidate(&self, leave_type_id: LeaveTypeId) {
        self.cache.invalidate(&leave_type_id);
    }

    /// Drops all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<R: PolicyResolver> PolicyResolver for CachedPolicyResolver<R> {
    fn resolve(&self, leave_type_id: LeaveTypeId) -> Result<LeavePolicy, PolicyError> {
        if let Some(policy) = self.cache.get(&leave_type_id) {
            return Ok((*policy).clone());
        }

        let policy = self.inner.resolve(leave_type_id)?;
        self.cache.insert(leave_type_id, Arc::new(policy.clone()));
        Ok(policy)
    }
}

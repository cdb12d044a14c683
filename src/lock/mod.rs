use std::{sync::Arc, time::Duration};

use tracing::{debug, trace};

use crate::{
    config::{LockConfig, RenewPolicy},
    error::{LockError, Operation},
    store::KeyValueStore,
    util::Context,
};

mod renewable;
mod renewer;
mod sink;

pub use renewable::RenewableLock;
pub use sink::{ChannelSink, ErrorSink, LogSink};

/// A lease-based lock on one key of a shared store.
///
/// Acquiring writes a fresh random owner token under the key with the lease
/// as its TTL, and only succeeds if the key is absent. Releasing deletes the
/// key only if it still holds this handle's token, so a handle whose lease
/// ran out can never release somebody else's lock.
///
/// A handle caches a single token and is meant to be driven by one task at
/// a time; `lock` and `unlock` take `&mut self` for that reason. Handles
/// are not `Clone`, since two copies of one token could both release it:
///
/// ```compile_fail
/// fn cloneable<T: Clone>() {}
/// cloneable::<rdlock::DistributedLock>();
/// ```
pub struct DistributedLock {
    store: Arc<dyn KeyValueStore>,
    key: String,
    lease: Duration,
    renew_policy: RenewPolicy,
    token: Option<String>,
}

impl DistributedLock {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        lease_seconds: u64,
    ) -> Result<Self, LockError> {
        Self::from_config(store, LockConfig::new(key, lease_seconds))
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        config: LockConfig,
    ) -> Result<Self, LockError> {
        config.validate()?;
        Ok(Self {
            store,
            lease: config.lease(),
            key: config.key,
            renew_policy: config.renew_policy,
            token: None,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Whether this handle holds a token from its last acquisition.
    ///
    /// This is local knowledge only: the lease may have expired in the store
    /// without the handle noticing until its next `lock` or `unlock`.
    pub fn is_held(&self) -> bool {
        self.token.is_some()
    }

    /// Make one attempt to take the lock.
    ///
    /// `Ok(false)` means somebody else holds it. The cached token is only
    /// replaced when the attempt succeeds.
    pub async fn lock(&mut self, ctx: &Context) -> Result<bool, LockError> {
        let token = new_owner_token();
        let acquired = ctx
            .run(self.store.set_if_absent(&self.key, &token, self.lease))
            .await
            .ok_or_else(|| LockError::cancelled(Operation::Acquire, &self.key))?
            .map_err(|err| LockError::store(Operation::Acquire, &self.key, err))?;

        if acquired {
            debug!(key = %self.key, lease = ?self.lease, "lock acquired");
            trace!(key = %self.key, token = %token, "owner token issued");
            self.token = Some(token);
        } else {
            debug!(key = %self.key, "lock held by another owner");
        }
        Ok(acquired)
    }

    /// Release the lock if this handle still owns it.
    ///
    /// `Ok(false)` without touching the store when the handle holds no
    /// token, and `Ok(false)` when the lease already expired or was taken
    /// over. The token is only dropped after a successful release.
    pub async fn unlock(&mut self, ctx: &Context) -> Result<bool, LockError> {
        let token = match &self.token {
            Some(token) => token,
            None => return Ok(false),
        };

        let released = ctx
            .run(self.store.delete_if_equals(&self.key, token))
            .await
            .ok_or_else(|| LockError::cancelled(Operation::Release, &self.key))?
            .map_err(|err| LockError::store(Operation::Release, &self.key, err))?;

        if released {
            debug!(key = %self.key, "lock released");
            self.token = None;
        } else {
            debug!(key = %self.key, "lock already expired or owned by someone else");
        }
        Ok(released)
    }

    /// A copy of this handle for the renewal task, token included.
    pub(crate) fn renewal_copy(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            lease: self.lease,
            renew_policy: self.renew_policy,
            token: self.token.clone(),
        }
    }

    /// Push the lease out to a full `lease` from now.
    ///
    /// `Ok(false)` when there is nothing left to renew.
    pub(crate) async fn renew(&self, ctx: &Context) -> Result<bool, LockError> {
        let refresh = async {
            match (self.renew_policy, &self.token) {
                (RenewPolicy::OwnerChecked, Some(token)) => {
                    self.store
                        .refresh_expiry_if_equals(&self.key, token, self.lease)
                        .await
                }
                (RenewPolicy::OwnerChecked, None) => Ok(false),
                (RenewPolicy::Unconditional, _) => {
                    self.store.refresh_expiry(&self.key, self.lease).await
                }
            }
        };

        let renewed = ctx
            .run(refresh)
            .await
            .ok_or_else(|| LockError::cancelled(Operation::Renew, &self.key))?
            .map_err(|err| LockError::store(Operation::Renew, &self.key, err))?;

        debug!(key = %self.key, renewed, "lease renewal");
        Ok(renewed)
    }
}

fn new_owner_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

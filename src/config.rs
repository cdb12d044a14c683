use std::time::Duration;

use serde::Deserialize;

use crate::error::LockError;

static DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";

/// Longest accepted lease. Redis keeps expiries in milliseconds as an `i64`.
pub const MAX_LEASE_SECONDS: u64 = i64::MAX as u64 / 1000;

/// How the renewal task extends a lease.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewPolicy {
    /// Reset the key's TTL without looking at its value.
    ///
    /// If the lease lapses and another owner takes the key before the next
    /// renewal fires, that renewal extends the *other* owner's lease.
    #[default]
    Unconditional,
    /// Reset the TTL only while the stored value is still this handle's
    /// token, checked and refreshed in one atomic step.
    OwnerChecked,
}

/// Settings for a single lock handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockConfig {
    pub key: String,
    pub lease_seconds: u64,
    #[serde(default)]
    pub renew_policy: RenewPolicy,
}

impl LockConfig {
    pub fn new(key: impl Into<String>, lease_seconds: u64) -> Self {
        Self {
            key: key.into(),
            lease_seconds,
            renew_policy: RenewPolicy::default(),
        }
    }

    pub fn with_renew_policy(mut self, renew_policy: RenewPolicy) -> Self {
        self.renew_policy = renew_policy;
        self
    }

    pub fn validate(&self) -> Result<(), LockError> {
        if self.key.is_empty() {
            return Err(LockError::InvalidConfig(
                "lock key must not be empty".to_string(),
            ));
        }
        if self.lease_seconds == 0 {
            return Err(LockError::InvalidConfig(format!(
                "lease for lock '{}' must be at least one second",
                self.key
            )));
        }
        if self.lease_seconds > MAX_LEASE_SECONDS {
            return Err(LockError::InvalidConfig(format!(
                "lease for lock '{}' must be at most {} seconds",
                self.key, MAX_LEASE_SECONDS
            )));
        }
        Ok(())
    }

    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.lease_seconds)
    }
}

/// Connection settings for the Redis store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key() {
        let err = LockConfig::new("", 10).validate().unwrap_err();
        assert!(matches!(err, LockError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_lease() {
        let err = LockConfig::new("jobs", 0).validate().unwrap_err();
        assert!(err.to_string().contains("jobs"));
    }

    #[test]
    fn rejects_leases_past_the_store_limit() {
        assert!(LockConfig::new("jobs", MAX_LEASE_SECONDS).validate().is_ok());
        let err = LockConfig::new("jobs", MAX_LEASE_SECONDS + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, LockError::InvalidConfig(_)));
        assert!(LockConfig::new("jobs", u64::MAX).validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: LockConfig =
            serde_json::from_str(r#"{ "key": "jobs", "lease_seconds": 30 }"#).unwrap();
        assert_eq!(config, LockConfig::new("jobs", 30));
        assert_eq!(config.lease(), Duration::from_secs(30));

        let config: LockConfig = serde_json::from_str(
            r#"{ "key": "jobs", "lease_seconds": 30, "renew_policy": "owner_checked" }"#,
        )
        .unwrap();
        assert_eq!(config.renew_policy, RenewPolicy::OwnerChecked);
        assert_eq!(RenewPolicy::default(), RenewPolicy::Unconditional);

        let store: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(store, StoreConfig::default());
    }
}

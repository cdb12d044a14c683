//! Lease-based mutual exclusion over a shared key-value store.
//!
//! A [`DistributedLock`] takes a named lock by atomically creating a key with
//! a TTL and releases it with an atomic compare-and-delete, so a handle can
//! only ever remove its own lease. A [`RenewableLock`] additionally keeps the
//! lease alive from a background task until the [`Context`] it was locked
//! under is cancelled.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rdlock::{Context, RedisStore, RenewableLock, StoreConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RedisStore::connect(&StoreConfig::default()).await?);
//! let ctx = Context::new();
//! let mut lock = RenewableLock::new(store, "reports:nightly", 30)?;
//!
//! if lock.lock(&ctx).await? {
//!     // critical section
//!     lock.unlock(&ctx).await?;
//! }
//! ctx.cancel();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lock;
pub mod store;
pub mod util;

pub use config::{LockConfig, RenewPolicy, StoreConfig};
pub use error::{LockError, Operation, StoreError};
pub use lock::{ChannelSink, DistributedLock, ErrorSink, LogSink, RenewableLock};
pub use store::{InMemoryStore, KeyValueStore, RedisStore};
pub use util::Context;

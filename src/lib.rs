//! # spawnpool
//!
//! Capacity-bounded object pool for gameplay props such as notes and hit
//! effects, which are spawned and despawned every frame.
//!
//! ## Features
//!
//! - Hard cap on the number of instances ever alive at once
//! - Prewarm at construction to avoid allocation spikes mid-song
//! - LIFO reuse so recently returned instances are handed out first
//! - Split take/enable for staging an instance before it becomes visible
//! - Idempotent returns and an optional return hook
//! - Metrics, Prometheus export and health status
//! - [`SharedPool`] for hosts that drive the pool from several threads
//!
//! ## Quick Start
//!
//! ```rust
//! use spawnpool::{ObjectPool, PoolConfiguration, PoolId, Poolable};
//!
//! #[derive(Clone, Default)]
//! struct HitEffect {
//!     playing: bool,
//!     pool: Option<PoolId>,
//! }
//!
//! impl Poolable for HitEffect {
//!     fn enable_from_pool(&mut self) { self.playing = true; }
//!     fn disable_into_pool(&mut self) { self.playing = false; }
//!     fn parent_pool(&self) -> Option<PoolId> { self.pool }
//!     fn set_parent_pool(&mut self, pool: PoolId) { self.pool = Some(pool); }
//! }
//!
//! let mut pool = ObjectPool::from_prefab(HitEffect::default(), PoolConfiguration::default());
//! if let Some(effect) = pool.take() {
//!     assert!(pool.get(effect).unwrap().playing);
//!     pool.return_object(effect);
//! }
//! assert_eq!(pool.active_count(), 0);
//! ```

mod pool;
mod poolable;
mod config;
mod metrics;
mod health;
mod shared;
mod errors;

pub use pool::{ObjectPool, PoolBuilder};
pub use poolable::{PoolHandle, PoolId, Poolable};
pub use config::{PoolConfiguration, DEFAULT_OBJECT_CAP, DEFAULT_PREWARM_AMOUNT};
pub use metrics::PoolMetrics;
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use health::HealthStatus;
pub use shared::SharedPool;
pub use errors::{PoolError, PoolResult};

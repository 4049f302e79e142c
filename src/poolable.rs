//! The capability contract for pooled instances

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an [`ObjectPool`](crate::ObjectPool).
///
/// Instances record the id of their owning pool instead of a reference to
/// it, so there is no ownership edge from instance back to pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, mostly useful for logging.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Identity of one instance owned by a pool.
///
/// Handles are cheap to copy and stay valid for the lifetime of the pool
/// that issued them, since pools never destroy their instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    pub(crate) pool: PoolId,
    pub(crate) slot: usize,
}

impl PoolHandle {
    /// The pool that issued this handle
    pub fn pool_id(&self) -> PoolId {
        self.pool
    }

    /// Slot index inside the owning pool
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// An instance that can be recycled by an [`ObjectPool`](crate::ObjectPool).
///
/// # Examples
///
/// ```
/// use spawnpool::{PoolId, Poolable};
///
/// #[derive(Default)]
/// struct Spark {
///     visible: bool,
///     pool: Option<PoolId>,
/// }
///
/// impl Poolable for Spark {
///     fn enable_from_pool(&mut self) {
///         self.visible = true;
///     }
///
///     fn disable_into_pool(&mut self) {
///         self.visible = false;
///     }
///
///     fn parent_pool(&self) -> Option<PoolId> {
///         self.pool
///     }
///
///     fn set_parent_pool(&mut self, pool: PoolId) {
///         self.pool = Some(pool);
///     }
/// }
/// ```
pub trait Poolable {
    /// Make the instance observably active. Called once per `take`.
    fn enable_from_pool(&mut self);

    /// Make the instance observably inactive. Called once per return.
    fn disable_into_pool(&mut self);

    /// The pool this instance returns to, if it has been claimed by one.
    fn parent_pool(&self) -> Option<PoolId>;

    /// Record the owning pool. Set once, when the pool first takes
    /// ownership of the instance.
    fn set_parent_pool(&mut self, pool: PoolId);
}

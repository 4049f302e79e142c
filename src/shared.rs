//! Lock-serialized pool handle for multi-threaded hosts

use crate::health::HealthStatus;
use crate::metrics::PoolMetrics;
use crate::pool::ObjectPool;
use crate::poolable::{PoolHandle, PoolId, Poolable};

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable, thread-safe front for an [`ObjectPool`]
///
/// Every call locks the pool for its whole duration, so operations stay
/// synchronous and never wait for an instance to become free. Exhaustion
/// is still reported as `None`.
///
/// The lock is not reentrant. Return hooks and `with_instance` closures run
/// with the lock held and must not use a `SharedPool` of the same pool.
///
/// # Examples
///
/// ```
/// use spawnpool::{ObjectPool, PoolConfiguration, PoolId, Poolable, SharedPool};
///
/// # #[derive(Default)]
/// # struct Spark { lit: bool, pool: Option<PoolId> }
/// # impl Poolable for Spark {
/// #     fn enable_from_pool(&mut self) { self.lit = true; }
/// #     fn disable_into_pool(&mut self) { self.lit = false; }
/// #     fn parent_pool(&self) -> Option<PoolId> { self.pool }
/// #     fn set_parent_pool(&mut self, pool: PoolId) { self.pool = Some(pool); }
/// # }
/// let pool = SharedPool::new(ObjectPool::new(Spark::default, PoolConfiguration::default()));
/// let worker = pool.clone();
///
/// let handle = std::thread::spawn(move || worker.take().unwrap()).join().unwrap();
/// assert_eq!(pool.with_instance(handle, |spark| spark.lit), Some(true));
///
/// pool.return_object(handle);
/// assert_eq!(pool.active_count(), 0);
/// ```
pub struct SharedPool<T> {
    inner: Arc<Mutex<ObjectPool<T>>>,
}

impl<T> Clone for SharedPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Poolable> SharedPool<T> {
    pub fn new(pool: ObjectPool<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Lock the pool for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, ObjectPool<T>> {
        self.inner.lock()
    }

    pub fn id(&self) -> PoolId {
        self.inner.lock().id()
    }

    pub fn can_spawn_amount(&self, count: usize) -> bool {
        self.inner.lock().can_spawn_amount(count)
    }

    pub fn take(&self) -> Option<PoolHandle> {
        self.inner.lock().take()
    }

    pub fn take_without_enabling(&self) -> Option<PoolHandle> {
        self.inner.lock().take_without_enabling()
    }

    pub fn return_object(&self, handle: PoolHandle) {
        self.inner.lock().return_object(handle)
    }

    pub fn return_all_objects(&self) {
        self.inner.lock().return_all_objects()
    }

    /// Run `f` against one instance while holding the lock
    pub fn with_instance<R>(&self, handle: PoolHandle, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.inner.lock().get_mut(handle).map(f)
    }

    pub fn free_count(&self) -> usize {
        self.inner.lock().free_count()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }

    pub fn metrics(&self) -> PoolMetrics {
        self.inner.lock().metrics()
    }

    pub fn health_status(&self) -> HealthStatus {
        self.inner.lock().health_status()
    }
}
